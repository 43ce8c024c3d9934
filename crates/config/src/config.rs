//! Main configuration module for SyncGuard.
//!
//! All settings live in a single `config.yaml`. Every scalar option can be
//! overridden through an environment variable with the `SYNCGUARD_` prefix
//! (dotted path upper-joined with underscores, e.g. `SYNCGUARD_NODE_ROLE`).

use crate::env::apply_env_overrides;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use syncguard_types::NodeRole;
use tracing::{debug, info};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identity of this node
    #[serde(default)]
    pub node: NodeConfig,

    /// The single remote SyncGuard peer
    #[serde(default)]
    pub peers: Vec<PeerConfig>,

    /// Paths and endpoints of the supervised validator
    #[serde(default)]
    pub cometbft: CometbftConfig,

    /// Health probing behavior
    #[serde(default)]
    pub health: HealthConfig,

    /// Failover thresholds and timing
    #[serde(default)]
    pub failover: FailoverConfig,

    /// Validator process supervision
    #[serde(default)]
    pub validator: ValidatorConfig,

    /// Logging behavior
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Shared cluster secret and replay window
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl Config {
    /// Load configuration from a YAML file, apply `SYNCGUARD_` environment
    /// overrides, and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        info!("Loading configuration from {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut config: Config = serde_yaml::from_str(&content)?;
        apply_env_overrides(&mut config)?;

        debug!("Configuration parsed, validating");
        config.validate()?;

        info!(
            "Configuration loaded: node={} role={} primary={}",
            config.node.id, config.node.role, config.node.is_primary
        );

        Ok(config)
    }

    /// Parse configuration from a YAML string. Environment overrides are
    /// not applied; useful for tests.
    pub fn from_str(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections for internal consistency.
    pub fn validate(&self) -> ConfigResult<()> {
        self.node.validate()?;

        if self.peers.len() != 1 {
            return Err(ConfigError::PeerCount(self.peers.len()));
        }
        for peer in &self.peers {
            peer.validate()?;
        }

        self.cometbft.validate()?;
        self.health.validate()?;
        self.failover.validate()?;
        self.validator.validate()?;
        self.logging.validate()?;
        self.cluster.validate()?;

        debug!("Configuration validation passed");
        Ok(())
    }

    /// Address of the single configured peer.
    pub fn peer(&self) -> &PeerConfig {
        &self.peers[0]
    }
}

// =============================================================================
// Node Configuration
// =============================================================================

/// Identity and boot role of this node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Stable identifier for this node
    #[serde(default)]
    pub id: String,

    /// Role at boot: "active" or "passive"
    #[serde(default = "default_role")]
    pub role: NodeRole,

    /// Primary site flag: this side reclaims the active role after recovery
    #[serde(default)]
    pub is_primary: bool,

    /// Peer-protocol listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_role() -> NodeRole {
    NodeRole::Passive
}

fn default_port() -> u16 {
    8080
}

impl NodeConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.id.is_empty() {
            return Err(ConfigError::MissingField("node.id"));
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            role: NodeRole::Passive,
            is_primary: false,
            port: 8080,
        }
    }
}

// =============================================================================
// Peer Configuration
// =============================================================================

/// The remote SyncGuard node. The design is pair-wise: exactly one peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Peer identifier
    pub id: String,

    /// Peer address as "host:port"
    pub address: String,
}

impl PeerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.address.is_empty() {
            return Err(ConfigError::MissingField("peers[0].address"));
        }
        Ok(())
    }
}

// =============================================================================
// CometBFT Configuration
// =============================================================================

/// Endpoints and file paths of the supervised validator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CometbftConfig {
    /// Validator RPC endpoint (e.g. "http://127.0.0.1:26657")
    #[serde(default)]
    pub rpc_url: String,

    /// Path to priv_validator_key.json
    #[serde(default)]
    pub key_path: String,

    /// Path to priv_validator_state.json
    #[serde(default)]
    pub state_path: String,

    /// Directory for best-effort key/state backups
    #[serde(default)]
    pub backup_path: String,
}

impl CometbftConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rpc_url.is_empty() {
            return Err(ConfigError::MissingField("cometbft.rpc_url"));
        }
        if self.key_path.is_empty() {
            return Err(ConfigError::MissingField("cometbft.key_path"));
        }
        if self.state_path.is_empty() {
            return Err(ConfigError::MissingField("cometbft.state_path"));
        }
        Ok(())
    }
}

// =============================================================================
// Health Configuration
// =============================================================================

/// Health probing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Probe interval in seconds
    pub interval: f64,

    /// Minimum peer count for the validator to be considered healthy
    pub min_peers: u32,

    /// Per-request HTTP timeout in seconds
    pub timeout: f64,
}

impl HealthConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.interval <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "health.interval",
                message: "must be positive".to_string(),
            });
        }
        if self.timeout <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "health.timeout",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval: 5.0,
            min_peers: 1,
            timeout: 5.0,
        }
    }
}

// =============================================================================
// Failover Configuration
// =============================================================================

/// Failover thresholds and timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig {
    /// Consecutive failed probes before an active node fails over
    pub retry_attempts: u32,

    /// Seconds a recovered primary waits before reclaiming the active role
    pub grace_period: f64,

    /// Seconds between passive-side state sync pulls
    pub state_sync_interval: f64,
}

impl FailoverConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "failover.retry_attempts",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs_f64(self.grace_period)
    }

    pub fn state_sync_interval(&self) -> Duration {
        Duration::from_secs_f64(self.state_sync_interval)
    }
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            grace_period: 60.0,
            state_sync_interval: 5.0,
        }
    }
}

// =============================================================================
// Validator Process Configuration
// =============================================================================

/// How the validator process is supervised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupervisionMode {
    /// Fork the validator binary directly
    #[default]
    Binary,
    /// docker stop / docker start on a named container
    Docker,
    /// docker compose up/stop/restart on a service
    DockerCompose,
}

/// Validator process supervision settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Enable process supervision
    #[serde(default)]
    pub enabled: bool,

    /// Supervision back-end
    #[serde(default)]
    pub mode: SupervisionMode,

    /// Path to the validator binary (binary mode)
    #[serde(default)]
    pub binary: String,

    /// Arguments for the validator binary (binary mode)
    #[serde(default)]
    pub args: Vec<String>,

    /// Container name or ID (docker mode)
    #[serde(default)]
    pub container: String,

    /// Compose file path (docker-compose mode)
    #[serde(default)]
    pub compose_file: String,

    /// Service name (docker-compose mode)
    #[serde(default)]
    pub service: String,

    /// Seconds to wait for a graceful stop before killing
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout: f64,

    /// Seconds to wait between stop and start on restart
    #[serde(default = "default_restart_delay")]
    pub restart_delay: f64,
}

fn default_stop_timeout() -> f64 {
    30.0
}

fn default_restart_delay() -> f64 {
    2.0
}

impl ValidatorConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }
        match self.mode {
            SupervisionMode::Binary => {
                if self.binary.is_empty() {
                    return Err(ConfigError::MissingField("validator.binary"));
                }
            }
            SupervisionMode::Docker => {
                if self.container.is_empty() {
                    return Err(ConfigError::MissingField("validator.container"));
                }
            }
            SupervisionMode::DockerCompose => {
                if self.compose_file.is_empty() {
                    return Err(ConfigError::MissingField("validator.compose_file"));
                }
                if self.service.is_empty() {
                    return Err(ConfigError::MissingField("validator.service"));
                }
            }
        }
        Ok(())
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.stop_timeout)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs_f64(self.restart_delay)
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: SupervisionMode::Binary,
            binary: String::new(),
            args: Vec::new(),
            container: String::new(),
            compose_file: String::new(),
            service: String::new(),
            stop_timeout: 30.0,
            restart_delay: 2.0,
        }
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Optional log file (appended alongside stdout)
    #[serde(default)]
    pub file: Option<String>,

    /// Log every probe result at info instead of debug
    #[serde(default)]
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.level.clone()));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            verbose: false,
        }
    }
}

// =============================================================================
// Cluster Configuration
// =============================================================================

/// Shared symmetric secret authenticating peer requests (HMAC) and
/// encrypting key transfers (AEAD), plus the replay-protection window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// The shared cluster secret. Prefer `SYNCGUARD_CLUSTER_SECRET` over
    /// placing this in the file.
    #[serde(default)]
    pub secret: String,

    /// Maximum accepted clock skew for signed requests, in seconds
    #[serde(default = "default_clock_skew")]
    pub max_clock_skew: f64,
}

fn default_clock_skew() -> f64 {
    30.0
}

impl ClusterConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.secret.is_empty() {
            return Err(ConfigError::MissingField("cluster.secret"));
        }
        if self.max_clock_skew <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "cluster.max_clock_skew",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn max_clock_skew(&self) -> Duration {
        Duration::from_secs_f64(self.max_clock_skew)
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            max_clock_skew: 30.0,
        }
    }
}
