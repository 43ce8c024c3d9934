//! # SyncGuard Types
//!
//! Shared data types for the SyncGuard failover controller:
//!
//! - **`ConsensusState`** - the `priv_validator_state.json` model with the
//!   `(height, round, step)` ordering used for all safety comparisons
//! - **`ValidatorKey`** - the `priv_validator_key.json` model (the private
//!   blob is carried, never interpreted)
//! - **`mock_key`** - the fixed inert key installed on passive nodes
//! - **`NodeRole`** - active / passive runtime role
//!
//! ## Example
//!
//! ```rust
//! use syncguard_types::ConsensusState;
//!
//! let local = ConsensusState::at(1000, 1, 3);
//! let remote = ConsensusState::at(999, 0, 1);
//!
//! // Local is strictly ahead, so taking over signing duties is safe.
//! assert!(local.is_ahead_of(&remote));
//! ```

pub mod key;
pub mod role;
pub mod state;

pub use key::{
    mock_key, ValidatorKey, MOCK_KEY_ADDRESS, SECP256K1_PRIV_KEY_TYPE, SECP256K1_PUB_KEY_TYPE,
};
pub use role::NodeRole;
pub use state::ConsensusState;
