//! The failover control loop.
//!
//! The supervisor owns the node's role and is the sole writer of role
//! transitions. It drives the health loop, the passive-side state sync
//! loop, the signature-ledger pruner, and the peer server, and executes
//! the two transitions:
//!
//! - **failover** (active -> passive) after `retry_attempts` consecutive
//!   failed probes: push the key to the peer, swap the local key to the
//!   mock, restart the validator, release the state lock, notify the
//!   peer. Failures after the key swap roll forward - a node that cannot
//!   sign is the safe outcome.
//! - **failback** (passive -> active, primary site only) once the local
//!   validator has been healthy through the grace period: pull the key,
//!   take the state lock, adopt the peer's state, restart, notify. Any
//!   refusal aborts and leaves the node passive.

use crate::bridges::{HealthBridge, KeyBridge, RestartBridge, StateBridge};
use crate::roles::RoleState;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use syncguard_config::{Config, SupervisionMode};
use syncguard_health::HealthProber;
use syncguard_peer::{PeerClient, PeerServer, PeerServerConfig, RoleAccess, ValidatorRestart};
use syncguard_process::{new_manager, wait_healthy, ProcessConfig, ProcessManager, ProcessMode};
use syncguard_store::{KeyStore, SignatureLedger, StateStore, StoreError};
use syncguard_types::{ConsensusState, NodeRole};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How long boot waits for the first healthy probe of a freshly started
/// validator.
const BOOT_HEALTH_TIMEOUT: Duration = Duration::from_secs(60);

/// Coordinates all subsystems of one SyncGuard node.
pub struct FailoverSupervisor {
    config: Arc<Config>,
    roles: Arc<RoleState>,
    state_store: Arc<StateStore>,
    key_store: Arc<KeyStore>,
    ledger: Arc<SignatureLedger>,
    prober: Arc<HealthProber>,
    process: Option<Arc<dyn ProcessManager>>,
    peer: Arc<PeerClient>,
    shutdown: broadcast::Sender<()>,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl FailoverSupervisor {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let roles = Arc::new(RoleState::new(config.node.role, config.node.is_primary));
        let state_store = Arc::new(StateStore::new(
            &config.cometbft.state_path,
            &config.cometbft.backup_path,
        ));
        let key_store = Arc::new(KeyStore::new(
            &config.cometbft.key_path,
            &config.cometbft.backup_path,
        ));
        let prober = Arc::new(HealthProber::new(
            &config.cometbft.rpc_url,
            config.health.min_peers,
            config.health.timeout(),
        ));
        let peer = Arc::new(PeerClient::new(
            &config.peer().address,
            &config.cluster.secret,
        ));

        let process = config.validator.enabled.then(|| {
            new_manager(ProcessConfig {
                mode: match config.validator.mode {
                    SupervisionMode::Binary => ProcessMode::Binary,
                    SupervisionMode::Docker => ProcessMode::Docker,
                    SupervisionMode::DockerCompose => ProcessMode::DockerCompose,
                },
                binary: config.validator.binary.clone(),
                args: config.validator.args.clone(),
                container: config.validator.container.clone(),
                compose_file: config.validator.compose_file.clone(),
                service: config.validator.service.clone(),
                stop_timeout: config.validator.stop_timeout(),
                restart_delay: config.validator.restart_delay(),
            })
        });

        let (shutdown, _) = broadcast::channel(1);

        Self {
            config,
            roles,
            state_store,
            key_store,
            ledger: Arc::new(SignatureLedger::new()),
            prober,
            process,
            peer,
            shutdown,
            tasks: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Whether this node currently holds signing duties.
    pub fn is_active(&self) -> bool {
        self.roles.is_active()
    }

    /// Whether this node is the primary site.
    pub fn is_primary(&self) -> bool {
        self.roles.is_primary()
    }

    /// Current role.
    pub fn role(&self) -> NodeRole {
        self.roles.role()
    }

    /// Boot the node: start the supervised validator (if enabled), load
    /// local state, settle lock ownership for the configured role, run
    /// the primary-collision sanity check, and launch all loops plus the
    /// peer server.
    pub async fn start(self: &Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Starting failover supervisor - primary: {}, role: {}",
            self.roles.is_primary(),
            self.roles.role()
        );

        if let Some(process) = &self.process {
            process
                .start()
                .await
                .context("failed to start validator node")?;

            let prober = Arc::clone(&self.prober);
            let probe = move || {
                let prober = Arc::clone(&prober);
                async move { prober.check().await.healthy }
            };
            if let Err(e) = wait_healthy(BOOT_HEALTH_TIMEOUT, probe).await {
                warn!("Node not healthy after start: {}", e);
            }
        }

        let state = self
            .state_store
            .load_state()
            .context("failed to load validator state")?;
        self.observe_signed(&state);

        if self.roles.is_active() {
            self.key_store
                .initialize()
                .context("failed to initialize validator key")?;
            self.state_store
                .acquire_lock()
                .context("state lock is held; refusing to boot as active")?;
        } else {
            self.state_store.release_lock()?;
        }

        self.check_primary_collision().await?;

        self.spawn_server();
        self.spawn_loops();

        Ok(())
    }

    /// Both sides carrying the primary flag would make both reclaim the
    /// active role; abort boot when the peer is reachable and also
    /// reports primary.
    async fn check_primary_collision(&self) -> anyhow::Result<()> {
        if !self.roles.is_primary() {
            return Ok(());
        }

        match self.peer.fetch_health().await {
            Ok(peer) if peer.primary => {
                anyhow::bail!("peer also reports primary site; fix node.is_primary on one side")
            }
            Ok(_) => {}
            Err(e) => debug!("Peer health not reachable at boot: {}", e),
        }
        Ok(())
    }

    fn spawn_server(&self) {
        let server = PeerServer::new(
            PeerServerConfig {
                port: self.config.node.port,
                secret: self.config.cluster.secret.clone(),
                max_clock_skew: self.config.cluster.max_clock_skew(),
            },
            Arc::new(StateBridge(Arc::clone(&self.state_store))),
            Arc::new(KeyBridge(Arc::clone(&self.key_store))),
            Arc::new(HealthBridge(Arc::clone(&self.prober))),
            Arc::clone(&self.roles) as Arc<dyn RoleAccess>,
            self.process
                .as_ref()
                .map(|p| Arc::new(RestartBridge(Arc::clone(p))) as Arc<dyn ValidatorRestart>),
        );

        let shutdown = self.shutdown.subscribe();
        self.tasks.lock().push(tokio::spawn(async move {
            if let Err(e) = server.serve(shutdown).await {
                error!("Peer server error: {}", e);
            }
        }));
    }

    fn spawn_loops(self: &Arc<Self>) {
        let mut tasks = self.tasks.lock();

        let this = Arc::clone(self);
        tasks.push(tokio::spawn(async move { this.health_loop().await }));

        let this = Arc::clone(self);
        tasks.push(tokio::spawn(async move { this.state_sync_loop().await }));

        let ledger = Arc::clone(&self.ledger);
        let shutdown = self.shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            ledger.run_pruner(shutdown).await
        }));
    }

    /// Stop all loops, release the state lock, and stop the supervised
    /// validator. Safe to call more than once.
    pub async fn stop(&self) {
        info!("Shutting down failover supervisor");
        let _ = self.shutdown.send(());

        let handles: Vec<_> = self.tasks.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }

        if let Err(e) = self.state_store.release_lock() {
            error!("Failed to release state lock on shutdown: {}", e);
        }

        if let Some(process) = &self.process {
            if let Err(e) = process.stop().await {
                error!("Failed to stop validator node: {}", e);
            }
        }

        info!("Failover supervisor stopped");
    }

    // =========================================================================
    // Health loop
    // =========================================================================

    async fn health_loop(self: Arc<Self>) {
        let mut shutdown = self.shutdown.subscribe();
        let mut ticker = tokio::time::interval(self.config.health.interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.health_tick().await,
                _ = shutdown.recv() => return,
            }
        }
    }

    async fn health_tick(self: &Arc<Self>) {
        let health = self.prober.check().await;
        let role = self.roles.role();

        if self.config.logging.verbose {
            info!(
                "[{}] height={} peers={} healthy={}",
                role, health.height, health.peers, health.healthy
            );
        } else {
            debug!(
                "[{}] height={} peers={} healthy={}",
                role, health.height, health.peers, health.healthy
            );
        }

        if health.healthy {
            self.roles.reset_failures();

            if self.roles.is_primary() && !self.roles.is_active() && self.roles.try_begin_failback()
            {
                let this = Arc::clone(self);
                tokio::spawn(async move { this.consider_failback().await });
            }
        } else {
            warn!(
                "Node unhealthy - syncing: {}, height: {}, peers: {}",
                health.syncing, health.height, health.peers
            );

            let failures = self.roles.record_failure();
            if failures >= self.config.failover.retry_attempts && self.roles.is_active() {
                error!("Maximum failures reached, initiating failover");
                self.initiate_failover().await;
            }
        }
    }

    // =========================================================================
    // Failover (active -> passive)
    // =========================================================================

    async fn initiate_failover(&self) {
        let _guard = self.roles.transition_lock().await;
        if !self.roles.is_active() {
            return;
        }

        info!("Initiating failover - releasing validator duties");

        // Best-effort key push; the peer may already hold a copy.
        match self.key_store.bytes() {
            Ok(bytes) => {
                if let Err(e) = self.peer.send_key(&bytes).await {
                    error!("Failed to transfer key to peer: {}", e);
                }
            }
            Err(e) => error!("Failed to read key for transfer: {}", e),
        }

        // From here on, errors roll forward: a node that cannot sign is
        // the safe outcome.
        if let Err(e) = self.key_store.deactivate() {
            error!("Failed to disable local key: {}", e);
        }

        self.restart_validator().await;

        if let Err(e) = self.state_store.release_lock() {
            error!("Failed to release state lock: {}", e);
        }

        if let Err(e) = self.peer.notify_failover().await {
            error!("Failed to notify peer of failover: {}", e);
        }

        self.roles.set_active(false);
        self.roles.reset_failures();

        info!("Failover complete - node is now passive");
    }

    // =========================================================================
    // Failback (passive -> active, primary site only)
    // =========================================================================

    async fn consider_failback(self: Arc<Self>) {
        self.run_failback().await;
        self.roles.end_failback();
    }

    async fn run_failback(&self) {
        if self.roles.is_active() {
            return;
        }

        let mut shutdown = self.shutdown.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(self.config.failover.grace_period()) => {}
            _ = shutdown.recv() => return,
        }

        // Re-probe after the grace period; a single unhealthy result
        // aborts and the next healthy streak re-arms the timer.
        let health = self.prober.check().await;
        if !health.healthy {
            info!("Primary unhealthy after grace period, aborting failback");
            return;
        }

        info!("Primary node healthy, initiating failback");
        self.initiate_failback().await;
    }

    async fn initiate_failback(&self) {
        let _guard = self.roles.transition_lock().await;
        if self.roles.is_active() {
            return;
        }

        info!("Initiating failback to primary");

        let key_bytes = match self.peer.fetch_key().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to get key from peer: {}", e);
                return;
            }
        };
        if let Err(e) = self.key_store.install_from_bytes(&key_bytes) {
            error!("Failed to install key from peer: {}", e);
            return;
        }

        if let Err(e) = self.state_store.acquire_lock() {
            error!("Failed to acquire state lock: {}", e);
            return;
        }

        match self.peer.fetch_state().await {
            Ok(remote) => {
                if let Err(e) = self.state_store.sync_from_remote(&remote) {
                    error!("Failed to sync state from peer: {}", e);
                    self.abort_failback().await;
                    return;
                }
                self.observe_signed(&remote);
            }
            Err(e) => {
                error!("Failed to fetch state from peer: {}", e);
                self.abort_failback().await;
                return;
            }
        }

        if let Some(process) = &self.process {
            if let Err(e) = process.restart().await {
                error!("Failed to restart node: {}", e);
                self.abort_failback().await;
                return;
            }
        }

        if let Err(e) = self.peer.notify_failback().await {
            error!("Failed to notify peer of failback: {}", e);
        }

        self.roles.set_active(true);
        self.roles.reset_failures();

        info!("Failback complete - node is now active");
    }

    async fn abort_failback(&self) {
        if let Err(e) = self.state_store.release_lock() {
            error!("Failed to release lock after aborted failback: {}", e);
        }
    }

    // =========================================================================
    // State sync loop (passive side)
    // =========================================================================

    async fn state_sync_loop(self: Arc<Self>) {
        let mut shutdown = self.shutdown.subscribe();
        let mut ticker = tokio::time::interval(self.config.failover.state_sync_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.roles.is_active() {
                        if let Err(e) = self.sync_state_from_peer().await {
                            error!("State sync error: {}", e);
                        }
                    }
                }
                _ = shutdown.recv() => return,
            }
        }
    }

    async fn sync_state_from_peer(&self) -> anyhow::Result<()> {
        let remote = self.peer.fetch_state().await?;
        self.state_store.sync_from_remote(&remote)?;
        self.observe_signed(&remote);
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn restart_validator(&self) {
        if let Some(process) = &self.process {
            if let Err(e) = process.restart().await {
                error!("Failed to restart node: {}", e);
            }
        }
    }

    /// Feed an observed signed position into the double-sign ledger.
    fn observe_signed(&self, state: &ConsensusState) {
        if state.position() == (0, 0, 0) {
            return;
        }
        match self
            .ledger
            .record(state.height, state.round, state.step)
        {
            Ok(()) | Err(StoreError::DuplicateRecord { .. }) => {}
            Err(e) => debug!("Signature ledger rejected observed position: {}", e),
        }
    }

    /// The double-sign ledger, for observability and tests.
    pub fn ledger(&self) -> &SignatureLedger {
        &self.ledger
    }

    /// Consecutive failed probes so far.
    pub fn failure_count(&self) -> u32 {
        self.roles.failure_count()
    }

    /// Whether a failback attempt is currently in flight.
    pub fn failback_in_progress(&self) -> bool {
        self.roles.failback_in_progress()
    }
}
