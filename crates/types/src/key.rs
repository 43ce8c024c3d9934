//! Validator key file model (`priv_validator_key.json`).
//!
//! SyncGuard moves this file between nodes but never interprets the key
//! material itself: the public and private blobs are opaque JSON values.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Key type tag for secp256k1 public keys in the validator key file.
pub const SECP256K1_PUB_KEY_TYPE: &str = "tendermint/PubKeySecp256k1";

/// Key type tag for secp256k1 private keys in the validator key file.
pub const SECP256K1_PRIV_KEY_TYPE: &str = "tendermint/PrivKeySecp256k1";

/// Address of the fixed mock key. A validator restarted with this key
/// boots normally but has no voting power, so it cannot sign on the real
/// chain.
pub const MOCK_KEY_ADDRESS: &str = "48DC218393FCEEF56A37D963B804FAB92C62CA9D";

/// The validator signing key file.
///
/// `pub_key` and `priv_key` are typed blobs (`{"type": ..., "value": ...}`)
/// kept as raw JSON so any key scheme the validator understands passes
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorKey {
    /// Validator address: 40 uppercase hex characters.
    pub address: String,

    /// Opaque public key blob.
    pub pub_key: serde_json::Value,

    /// Opaque private key blob. Never parsed beyond JSON validity.
    pub priv_key: serde_json::Value,
}

impl ValidatorKey {
    /// True iff this is the fixed mock key.
    pub fn is_mock(&self) -> bool {
        self.address == MOCK_KEY_ADDRESS
    }
}

/// The fixed, public, deterministic mock key.
///
/// Installed in place of the real key to render a passive node's validator
/// inert while still letting the process boot with a syntactically valid
/// key file.
pub fn mock_key() -> ValidatorKey {
    ValidatorKey {
        address: MOCK_KEY_ADDRESS.to_string(),
        pub_key: json!({
            "type": SECP256K1_PUB_KEY_TYPE,
            "value": "AvLo+lkg0UWozoI+pJzv1a7upt+HaMxZCdWgRxvZ8Cb1",
        }),
        priv_key: json!({
            "type": SECP256K1_PRIV_KEY_TYPE,
            "value": "ansj9FenmlrmNrxi0BXgZ+YfJBSGZqy20i7/K7CdOiQ=",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_key_is_recognized() {
        assert!(mock_key().is_mock());
    }

    #[test]
    fn key_round_trips_through_json() {
        let key = mock_key();
        let data = serde_json::to_vec_pretty(&key).unwrap();
        let parsed: ValidatorKey = serde_json::from_slice(&data).unwrap();
        assert_eq!(parsed, key);
    }
}
