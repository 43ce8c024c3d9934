//! Tests for the key-transport cipher and request authentication.

use syncguard_crypto::{auth, cipher, CryptoError};

#[test]
fn test_round_trip_various_sizes() {
    for size in [0usize, 1, 16, 1024, 64 * 1024] {
        let data = vec![0xA5u8; size];
        let blob = cipher::encrypt(&data, "cluster-secret").unwrap();
        assert_eq!(cipher::decrypt(&blob, "cluster-secret").unwrap(), data);
    }
}

#[test]
fn test_blob_framing() {
    // salt(16) + nonce(12) + ciphertext + tag(16)
    let blob = cipher::encrypt(b"abc", "secret").unwrap();
    assert_eq!(blob.len(), 16 + 12 + 3 + 16);
}

#[test]
fn test_wrong_secret_yields_no_plaintext() {
    let blob = cipher::encrypt(b"priv_validator_key.json contents", "right").unwrap();
    let result = cipher::decrypt(&blob, "wrong");
    assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
}

#[test]
fn test_hmac_single_bit_flip_fails() {
    let message = auth::canonical_message("POST", "/validator_key", 1700000000);
    let sig = auth::sign(&message, "secret");
    assert!(auth::verify(&message, &sig, "secret"));

    // Flip one bit of the message.
    let tampered = auth::canonical_message("POST", "/validator_kex", 1700000000);
    assert!(!auth::verify(&tampered, &sig, "secret"));

    // Flip one hex digit of the signature.
    let mut bad_sig = sig.clone().into_bytes();
    bad_sig[0] = if bad_sig[0] == b'0' { b'1' } else { b'0' };
    assert!(!auth::verify(&message, &String::from_utf8(bad_sig).unwrap(), "secret"));

    // Different secret.
    assert!(!auth::verify(&message, &sig, "secrets"));
}
