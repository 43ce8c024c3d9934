//! # SyncGuard Store
//!
//! Owns the two files SyncGuard shares with the validator process and the
//! in-memory double-sign ledger:
//!
//! - **`StateStore`** - `priv_validator_state.json`: atomic writes, the
//!   exclusive lockfile, and the two safety comparators (take-over and
//!   adopt-remote)
//! - **`KeyStore`** - `priv_validator_key.json`: atomic writes, the
//!   mock-key swap that renders a node inert, restoration, and encrypted
//!   transport
//! - **`SignatureLedger`** - bounded set of `(height, round, step)`
//!   positions this node has been observed to sign
//!
//! All file mutation goes through these stores; the validator is assumed
//! to be stopped or holding the mock key whenever SyncGuard writes.

mod error;
pub mod key;
pub mod ledger;
pub mod state;

pub use error::{StoreError, StoreResult};
pub use key::KeyStore;
pub use ledger::SignatureLedger;
pub use state::StateStore;
