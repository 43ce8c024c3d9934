//! Docker container back-end.
//!
//! Drives a pre-created container with `docker start` / `docker stop`.
//! The stop timeout is delegated to the docker daemon via `-t`.

use crate::error::ProcessResult;
use crate::manager::{ProcessConfig, ProcessManager};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

pub(crate) mod cmd {
    use crate::error::{ProcessError, ProcessResult};
    use tokio::process::Command;

    /// Run `docker <args>`, treating a nonzero exit as an error.
    pub async fn docker(args: &[&str]) -> ProcessResult<Vec<u8>> {
        let output = Command::new("docker")
            .args(args)
            .output()
            .await
            .map_err(|e| ProcessError::Spawn {
                program: "docker".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ProcessError::CommandFailed {
                program: format!("docker {}", args.join(" ")),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output.stdout)
    }
}

/// Supervises the validator as a docker container.
pub struct DockerManager {
    container: String,
    stop_timeout: Duration,
    restart_delay: Duration,
}

impl DockerManager {
    pub fn new(config: ProcessConfig) -> Self {
        Self {
            container: config.container,
            stop_timeout: config.stop_timeout,
            restart_delay: config.restart_delay,
        }
    }
}

#[async_trait]
impl ProcessManager for DockerManager {
    async fn start(&self) -> ProcessResult<()> {
        info!("Starting validator container {}", self.container);
        cmd::docker(&["start", &self.container]).await?;
        Ok(())
    }

    async fn stop(&self) -> ProcessResult<()> {
        info!("Stopping validator container {}", self.container);
        let timeout = self.stop_timeout.as_secs().to_string();
        cmd::docker(&["stop", "-t", &timeout, &self.container]).await?;
        Ok(())
    }

    async fn restart(&self) -> ProcessResult<()> {
        info!("Restarting validator container {}", self.container);
        self.stop().await?;
        tokio::time::sleep(self.restart_delay).await;
        self.start().await
    }

    async fn is_running(&self) -> bool {
        match cmd::docker(&["inspect", "-f", "{{.State.Running}}", &self.container]).await {
            Ok(stdout) => String::from_utf8_lossy(&stdout).trim() == "true",
            Err(_) => false,
        }
    }
}
