//! Docker Compose service back-end.
//!
//! Drives a compose service with `docker compose -f <file> up -d`,
//! `stop -t`, and `restart -t`. Compose handles the stop/start sequencing
//! of a restart itself, so the restart delay is left to the daemon.

use crate::docker::cmd;
use crate::error::ProcessResult;
use crate::manager::{ProcessConfig, ProcessManager};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Supervises the validator as a docker compose service.
pub struct ComposeManager {
    compose_file: String,
    service: String,
    stop_timeout: Duration,
}

impl ComposeManager {
    pub fn new(config: ProcessConfig) -> Self {
        Self {
            compose_file: config.compose_file,
            service: config.service,
            stop_timeout: config.stop_timeout,
        }
    }

    fn timeout_arg(&self) -> String {
        self.stop_timeout.as_secs().to_string()
    }
}

#[async_trait]
impl ProcessManager for ComposeManager {
    async fn start(&self) -> ProcessResult<()> {
        info!(
            "Starting validator via docker compose: {} (service: {})",
            self.compose_file, self.service
        );
        cmd::docker(&["compose", "-f", &self.compose_file, "up", "-d", &self.service]).await?;
        Ok(())
    }

    async fn stop(&self) -> ProcessResult<()> {
        info!(
            "Stopping validator via docker compose: {} (service: {})",
            self.compose_file, self.service
        );
        let timeout = self.timeout_arg();
        cmd::docker(&[
            "compose",
            "-f",
            &self.compose_file,
            "stop",
            "-t",
            &timeout,
            &self.service,
        ])
        .await?;
        Ok(())
    }

    async fn restart(&self) -> ProcessResult<()> {
        info!(
            "Restarting validator via docker compose: {} (service: {})",
            self.compose_file, self.service
        );
        let timeout = self.timeout_arg();
        cmd::docker(&[
            "compose",
            "-f",
            &self.compose_file,
            "restart",
            "-t",
            &timeout,
            &self.service,
        ])
        .await?;
        Ok(())
    }

    async fn is_running(&self) -> bool {
        match cmd::docker(&["compose", "-f", &self.compose_file, "ps", "-q", &self.service]).await {
            Ok(stdout) => !stdout.is_empty(),
            Err(_) => false,
        }
    }
}
