//! # SyncGuard Peer
//!
//! HTTP coordination between the two SyncGuard nodes.
//!
//! The server exposes the peer protocol endpoints:
//!
//! | Method | Path | Meaning |
//! |---|---|---|
//! | GET | `/validator_state` | Local last-signed state |
//! | GET | `/validator_key` | Local key bytes |
//! | POST | `/validator_key` | Install an encrypted key transfer |
//! | POST | `/failover_notify` | Peer went passive; take over if eligible |
//! | POST | `/failback_notify` | Peer reclaims; step down if active |
//! | GET | `/health` | `{healthy, active, primary, height}` |
//!
//! Every POST must carry `X-Signature`/`X-Timestamp` headers: an
//! HMAC-SHA256 over `"<METHOD> <PATH> <timestamp>"` under the shared
//! cluster secret, rejected outside the configured clock-skew window.
//! Key transfers are AEAD-encrypted; a failed decryption never touches
//! disk.
//!
//! Handlers reach the rest of the node only through the narrow capability
//! traits in [`traits`], so the server is testable against mocks.

mod auth;
mod client;
mod error;
mod server;
pub mod traits;

pub use client::PeerClient;
pub use error::{PeerError, PeerResult};
pub use server::{PeerHealth, PeerServer, PeerServerConfig};
pub use traits::{HealthAccess, KeyAccess, RoleAccess, StateAccess, ValidatorRestart};
