//! Peer protocol error types.

use thiserror::Error;

/// Errors surfaced by the peer client and server.
#[derive(Debug, Error)]
pub enum PeerError {
    /// Outbound HTTP request failed (connect, timeout, or body read)
    #[error("peer request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The peer answered with a non-success status
    #[error("peer returned status {status} for {path}")]
    Status { path: String, status: u16 },

    /// The peer's response body did not parse
    #[error("invalid peer response for {path}: {message}")]
    InvalidResponse { path: String, message: String },

    /// Key transport encryption or decryption failed
    #[error(transparent)]
    Crypto(#[from] syncguard_crypto::CryptoError),

    /// Server socket failure
    #[error("peer server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for peer protocol operations.
pub type PeerResult<T> = Result<T, PeerError>;
