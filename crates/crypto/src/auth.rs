//! Peer request authentication.
//!
//! Mutating peer requests carry an HMAC-SHA256 signature over the
//! canonical message `"<METHOD> <PATH> <timestamp>"` under the shared
//! cluster secret, presented as the `X-Signature` and `X-Timestamp`
//! headers. Verification recomputes the tag and compares in constant
//! time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Build the canonical message covered by a request signature.
pub fn canonical_message(method: &str, path: &str, timestamp: u64) -> String {
    format!("{} {} {}", method, path, timestamp)
}

/// Compute the hex-encoded HMAC-SHA256 signature of `data` under `secret`.
pub fn sign(data: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex-encoded signature against `data` and `secret`.
///
/// The comparison is constant-time. Malformed hex fails verification
/// rather than erroring.
pub fn verify(data: &str, signature: &str, secret: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    mac.verify_slice(&sig_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let message = canonical_message("POST", "/failover_notify", 1700000000);
        let sig = sign(&message, "secret");
        assert!(verify(&message, &sig, "secret"));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = sign("payload", "secret");
        assert!(!verify("payload", &sig, "other-secret"));
    }

    #[test]
    fn tampered_data_fails() {
        let sig = sign("payload", "secret");
        assert!(!verify("payloae", &sig, "secret"));
    }

    #[test]
    fn malformed_hex_fails() {
        assert!(!verify("payload", "zz-not-hex", "secret"));
    }
}
