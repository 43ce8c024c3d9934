//! # SyncGuard Crypto
//!
//! Cryptographic primitives for the SyncGuard failover controller:
//!
//! - **Request authentication** - HMAC-SHA256 over a canonical
//!   `"<METHOD> <PATH> <timestamp>"` message, hex-encoded, verified in
//!   constant time
//! - **Key-transport cipher** - AES-256-GCM under a key derived with
//!   HKDF-SHA256 from the shared cluster secret, framed as
//!   `salt(16) ‖ nonce(12) ‖ ciphertext+tag`
//! - **Key generation** - fresh secp256k1 validator key pairs with
//!   CometBFT address derivation
//!
//! ## Example
//!
//! ```rust
//! use syncguard_crypto::{auth, cipher};
//!
//! let message = auth::canonical_message("POST", "/validator_key", 1700000000);
//! let signature = auth::sign(&message, "cluster-secret");
//! assert!(auth::verify(&message, &signature, "cluster-secret"));
//!
//! let blob = cipher::encrypt(b"key bytes", "cluster-secret").unwrap();
//! assert_eq!(cipher::decrypt(&blob, "cluster-secret").unwrap(), b"key bytes");
//! ```

pub mod auth;
pub mod cipher;
pub mod keygen;

pub use keygen::generate_validator_key;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Ciphertext shorter than the salt + nonce framing
    #[error("ciphertext too short: {0} bytes")]
    CiphertextTooShort(usize),

    /// AEAD decryption failed (wrong secret or tampered data)
    #[error("decryption failed: authentication tag mismatch")]
    DecryptionFailed,

    /// AEAD encryption failed
    #[error("encryption failed")]
    EncryptionFailed,

    /// Key derivation failed
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Result alias for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
