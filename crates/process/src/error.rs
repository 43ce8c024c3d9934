//! Process supervision error types.

use thiserror::Error;

/// Errors that can occur while supervising the validator process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The validator is already running
    #[error("validator is already running")]
    AlreadyRunning,

    /// Failed to spawn the validator or a docker command
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A docker command exited nonzero
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The health probe did not pass before the deadline
    #[error("validator did not become healthy within {0:?}")]
    HealthTimeout(std::time::Duration),

    /// Other I/O failure while managing the process
    #[error("process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for process supervision operations.
pub type ProcessResult<T> = Result<T, ProcessError>;
