//! # SyncGuard Process
//!
//! Lifecycle management for the supervised validator process. Three
//! interchangeable back-ends implement the same [`ProcessManager`]
//! interface:
//!
//! - **binary** - forks the validator directly in its own process group
//! - **docker** - `docker stop` / `docker start` on a named container
//! - **docker-compose** - `docker compose` on a service
//!
//! A restart is stop, a configurable delay, then start. The binary
//! back-end watches for spontaneous child exits so `is_running` reflects
//! reality; it never restarts on its own - the control loop's next failed
//! health probe drives the usual failover path instead.

mod binary;
mod compose;
mod docker;
mod error;
mod manager;

pub use binary::BinaryManager;
pub use compose::ComposeManager;
pub use docker::DockerManager;
pub use error::{ProcessError, ProcessResult};
pub use manager::{new_manager, wait_healthy, ProcessConfig, ProcessManager, ProcessMode};
