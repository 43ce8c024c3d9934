//! Direct binary back-end.
//!
//! Forks the validator in its own process group so signals reach the
//! whole tree. Stop sends SIGTERM and escalates to SIGKILL on the group
//! after the stop timeout. A watcher task tracks the child so
//! `is_running` reflects spontaneous exits; an unexpected exit is logged
//! and left for the control loop's next health probe to act on.

use crate::error::{ProcessError, ProcessResult};
use crate::manager::{ProcessConfig, ProcessManager};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

struct ProcState {
    running: watch::Sender<bool>,
    stopping: AtomicBool,
    pid: Mutex<Option<i32>>,
}

/// Supervises the validator as a directly spawned child process.
pub struct BinaryManager {
    binary: String,
    args: Vec<String>,
    stop_timeout: Duration,
    restart_delay: Duration,
    state: Arc<ProcState>,
}

impl BinaryManager {
    pub fn new(config: ProcessConfig) -> Self {
        let (running, _) = watch::channel(false);
        Self {
            binary: config.binary,
            args: config.args,
            stop_timeout: config.stop_timeout,
            restart_delay: config.restart_delay,
            state: Arc::new(ProcState {
                running,
                stopping: AtomicBool::new(false),
                pid: Mutex::new(None),
            }),
        }
    }
}

#[async_trait]
impl ProcessManager for BinaryManager {
    async fn start(&self) -> ProcessResult<()> {
        if *self.state.running.borrow() {
            return Err(ProcessError::AlreadyRunning);
        }

        info!("Starting validator node: {} {:?}", self.binary, self.args);

        let mut child = Command::new(&self.binary)
            .args(&self.args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .process_group(0)
            .spawn()
            .map_err(|e| ProcessError::Spawn {
                program: self.binary.clone(),
                source: e,
            })?;

        let pid = child.id().map(|p| p as i32);
        *self.state.pid.lock() = pid;
        self.state.stopping.store(false, Ordering::SeqCst);
        self.state.running.send_replace(true);

        if let Some(pid) = pid {
            info!("Validator node started with PID {}", pid);
        }

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let result = child.wait().await;
            let expected = state.stopping.load(Ordering::SeqCst);
            match result {
                Ok(status) if expected => info!("Validator node stopped ({})", status),
                Ok(status) if status.success() => info!("Validator node exited cleanly"),
                Ok(status) => error!("Validator node exited unexpectedly with {}", status),
                Err(e) => error!("Failed to wait on validator node: {}", e),
            }
            state.running.send_replace(false);
        });

        Ok(())
    }

    async fn stop(&self) -> ProcessResult<()> {
        let pid = *self.state.pid.lock();
        let Some(pid) = pid else {
            debug!("Validator not running, nothing to stop");
            return Ok(());
        };

        let mut rx = self.state.running.subscribe();
        if !*rx.borrow() {
            *self.state.pid.lock() = None;
            return Ok(());
        }

        info!("Stopping validator node (PID {})", pid);
        self.state.stopping.store(true, Ordering::SeqCst);
        signal_group(pid, libc::SIGTERM);

        let graceful = rx.wait_for(|running| !running);
        if tokio::time::timeout(self.stop_timeout, graceful).await.is_err() {
            warn!("Stop timeout, sending SIGKILL to process group {}", pid);
            signal_group(pid, libc::SIGKILL);
            let mut rx = self.state.running.subscribe();
            let _ = rx.wait_for(|running| !running).await;
        }

        self.state.stopping.store(false, Ordering::SeqCst);
        *self.state.pid.lock() = None;
        Ok(())
    }

    async fn restart(&self) -> ProcessResult<()> {
        info!("Restarting validator node");
        self.stop().await?;
        tokio::time::sleep(self.restart_delay).await;
        self.start().await
    }

    async fn is_running(&self) -> bool {
        *self.state.running.borrow()
    }
}

/// Signal the whole process group of `pid`.
fn signal_group(pid: i32, signal: i32) {
    let rc = unsafe { libc::kill(-pid, signal) };
    if rc != 0 {
        warn!(
            "Failed to signal process group {}: {}",
            pid,
            std::io::Error::last_os_error()
        );
    }
}
