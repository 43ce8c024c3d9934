//! The process manager interface and back-end factory.

use crate::binary::BinaryManager;
use crate::compose::ComposeManager;
use crate::docker::DockerManager;
use crate::error::{ProcessError, ProcessResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Which back-end supervises the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    Binary,
    Docker,
    DockerCompose,
}

/// Back-end configuration. Only the fields for the selected mode are
/// consulted.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub mode: ProcessMode,
    /// Path to the validator binary (binary mode)
    pub binary: String,
    /// Arguments for the validator binary (binary mode)
    pub args: Vec<String>,
    /// Container name or ID (docker mode)
    pub container: String,
    /// Compose file path (docker-compose mode)
    pub compose_file: String,
    /// Service name (docker-compose mode)
    pub service: String,
    /// How long a graceful stop may take before escalating
    pub stop_timeout: Duration,
    /// Pause between stop and start during a restart
    pub restart_delay: Duration,
}

/// Lifecycle interface shared by all back-ends.
#[async_trait]
pub trait ProcessManager: Send + Sync {
    /// Start the validator.
    async fn start(&self) -> ProcessResult<()>;

    /// Stop the validator, escalating after the stop timeout.
    async fn stop(&self) -> ProcessResult<()>;

    /// Stop, wait the restart delay, start.
    async fn restart(&self) -> ProcessResult<()>;

    /// Whether the validator is currently running.
    async fn is_running(&self) -> bool;
}

/// Build the back-end selected by `config.mode`.
pub fn new_manager(config: ProcessConfig) -> Arc<dyn ProcessManager> {
    match config.mode {
        ProcessMode::Binary => Arc::new(BinaryManager::new(config)),
        ProcessMode::Docker => Arc::new(DockerManager::new(config)),
        ProcessMode::DockerCompose => Arc::new(ComposeManager::new(config)),
    }
}

/// Poll `probe` every second until it reports healthy or `timeout`
/// elapses.
pub async fn wait_healthy<F, Fut>(timeout: Duration, probe: F) -> ProcessResult<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        if tokio::time::Instant::now() >= deadline {
            return Err(ProcessError::HealthTimeout(timeout));
        }
        ticker.tick().await;
        if probe().await {
            return Ok(());
        }
        debug!("Waiting for validator to become healthy");
    }
}
