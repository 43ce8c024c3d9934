//! Key-transport cipher.
//!
//! Validator keys cross the wire as
//! `salt(16) ‖ nonce(12) ‖ AES-256-GCM ciphertext+tag`, with the 32-byte
//! AES key derived via HKDF-SHA256 from the cluster secret and the salt.
//! A fresh salt and nonce are drawn for every encryption. A tag mismatch
//! on decryption returns an error without producing any plaintext.

use crate::{CryptoError, CryptoResult};
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

fn derive_key(secret: &str, salt: &[u8]) -> CryptoResult<[u8; KEY_SIZE]> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), secret.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    hkdf.expand(&[], &mut key)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Encrypt `data` under a key derived from `secret`.
pub fn encrypt(data: &[u8], secret: &str) -> CryptoResult<Vec<u8>> {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let key = derive_key(secret, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), data)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut result = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&salt);
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt a blob produced by [`encrypt`] with the same `secret`.
pub fn decrypt(data: &[u8], secret: &str) -> CryptoResult<Vec<u8>> {
    if data.len() < SALT_SIZE + NONCE_SIZE {
        return Err(CryptoError::CiphertextTooShort(data.len()));
    }

    let (salt, rest) = data.split_at(SALT_SIZE);
    let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

    let key = derive_key(secret, salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let blob = encrypt(b"validator key bytes", "secret").unwrap();
        assert_eq!(decrypt(&blob, "secret").unwrap(), b"validator key bytes");
    }

    #[test]
    fn fresh_salt_and_nonce_each_time() {
        let a = encrypt(b"same input", "secret").unwrap();
        let b = encrypt(b"same input", "secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_secret_fails() {
        let blob = encrypt(b"data", "secret").unwrap();
        assert!(matches!(
            decrypt(&blob, "other"),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn truncated_blob_rejected() {
        assert!(matches!(
            decrypt(&[0u8; 10], "secret"),
            Err(CryptoError::CiphertextTooShort(10))
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let mut blob = encrypt(b"data", "secret").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert!(decrypt(&blob, "secret").is_err());
    }
}
