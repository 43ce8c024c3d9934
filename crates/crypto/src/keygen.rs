//! Validator key generation.
//!
//! Generates a fresh secp256k1 key pair in the validator's file format:
//! the address is the uppercase hex of the first 20 bytes of
//! SHA-256(compressed public key), and both key blobs are base64-encoded
//! with their CometBFT type tags.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use serde_json::json;
use sha2::{Digest, Sha256};
use syncguard_types::{ValidatorKey, SECP256K1_PRIV_KEY_TYPE, SECP256K1_PUB_KEY_TYPE};

/// Derive the validator address from a compressed secp256k1 public key.
pub fn address_from_pubkey(compressed: &[u8]) -> String {
    let digest = Sha256::digest(compressed);
    hex::encode_upper(&digest[..20])
}

/// Generate a fresh validator key pair.
pub fn generate_validator_key() -> ValidatorKey {
    let signing = SigningKey::random(&mut OsRng);
    let verifying = signing.verifying_key();

    let pub_bytes = verifying.to_encoded_point(true);
    let priv_bytes = signing.to_bytes();

    ValidatorKey {
        address: address_from_pubkey(pub_bytes.as_bytes()),
        pub_key: json!({
            "type": SECP256K1_PUB_KEY_TYPE,
            "value": BASE64.encode(pub_bytes.as_bytes()),
        }),
        priv_key: json!({
            "type": SECP256K1_PRIV_KEY_TYPE,
            "value": BASE64.encode(priv_bytes.as_slice()),
        }),
    }
}
