//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the state store, key store, or signature
/// ledger.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read a state or key file
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a state or key file
    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to rename a file during an atomic replace or key swap
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failure
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Received key bytes do not parse as a validator key file
    #[error("invalid key data: {source}")]
    InvalidKey {
        #[source]
        source: serde_json::Error,
    },

    /// The state file lock is held by another process
    #[error("state is already locked")]
    AlreadyLocked,

    /// Lockfile create or remove failure other than contention
    #[error("lock file operation on {path} failed: {source}")]
    LockIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote state is behind local; adopting it would roll back
    #[error("remote state (h={remote_height},r={remote_round},s={remote_step}) is behind local (h={local_height},r={local_round},s={local_step})")]
    BehindRemote {
        local_height: u64,
        local_round: i32,
        local_step: i8,
        remote_height: u64,
        remote_round: i32,
        remote_step: i8,
    },

    /// Remote state is at or ahead of local; taking over would risk a
    /// double sign
    #[error("remote state (h={remote_height},r={remote_round},s={remote_step}) is at or ahead of local (h={local_height},r={local_round},s={local_step})")]
    RemoteAhead {
        local_height: u64,
        local_round: i32,
        local_step: i8,
        remote_height: u64,
        remote_round: i32,
        remote_step: i8,
    },

    /// Neither `.real` nor `.disabled` sidecar exists
    #[error("no disabled key to restore")]
    NoKeyToRestore,

    /// This position was already signed
    #[error("already signed at height {height}, round {round}, step {step}")]
    AlreadySigned { height: u64, round: i32, step: i8 },

    /// Signing below the last signed height
    #[error("attempting to sign height {height} but already signed {last_signed}")]
    HeightRollback { height: u64, last_signed: u64 },

    /// Step does not advance past an already-signed step at the same
    /// height and round
    #[error("invalid step progression at height {height}, round {round}: {prev_step} -> {step}")]
    StepRegression {
        height: u64,
        round: i32,
        prev_step: i8,
        step: i8,
    },

    /// Position recorded twice
    #[error("signature already recorded for {height}:{round}:{step}")]
    DuplicateRecord { height: u64, round: i32, step: i8 },

    /// Key transport cipher failure
    #[error(transparent)]
    Crypto(#[from] syncguard_crypto::CryptoError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
