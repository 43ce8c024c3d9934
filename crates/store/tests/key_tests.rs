//! Tests for the key store: mock swap, restore, and encrypted transport.

use syncguard_store::{KeyStore, StoreError};
use syncguard_types::{mock_key, ValidatorKey, MOCK_KEY_ADDRESS};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> KeyStore {
    KeyStore::new(dir.path().join("priv_validator_key.json"), "")
}

#[test]
fn test_initialize_generates_once() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    assert!(!store.exists());
    store.initialize().unwrap();
    assert!(store.exists());

    let first = store.load().unwrap();
    assert_eq!(first.address.len(), 40);
    assert!(!first.is_mock());

    // A second initialize keeps the existing key.
    store.initialize().unwrap();
    assert_eq!(store.load().unwrap(), first);
}

#[test]
fn test_deactivate_swaps_to_mock() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.initialize().unwrap();
    let real = store.load().unwrap();

    store.deactivate().unwrap();

    let current = store.load().unwrap();
    assert_eq!(current.address, MOCK_KEY_ADDRESS);

    let sidecar = dir.path().join("priv_validator_key.json.real");
    assert!(sidecar.exists());
    let saved: ValidatorKey =
        serde_json::from_slice(&std::fs::read(sidecar).unwrap()).unwrap();
    assert_eq!(saved, real);
}

#[test]
fn test_deactivate_then_restore_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.initialize().unwrap();
    let before = store.bytes().unwrap();

    store.deactivate().unwrap();
    store.restore().unwrap();

    assert_eq!(store.bytes().unwrap(), before);
    assert!(!dir.path().join("priv_validator_key.json.real").exists());
}

#[test]
fn test_restore_from_legacy_disabled_sidecar() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let key = mock_key();
    let data = serde_json::to_vec_pretty(&key).unwrap();
    std::fs::write(dir.path().join("priv_validator_key.json.disabled"), &data).unwrap();

    store.restore().unwrap();
    assert_eq!(store.load().unwrap(), key);
}

#[test]
fn test_restore_with_nothing_to_restore() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(matches!(store.restore(), Err(StoreError::NoKeyToRestore)));
}

#[test]
fn test_install_rejects_invalid_bytes() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let result = store.install_from_bytes(b"not a key file");
    assert!(matches!(result, Err(StoreError::InvalidKey { .. })));
    assert!(!store.exists());
}

#[test]
fn test_install_accepts_key_bytes() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let data = serde_json::to_vec_pretty(&mock_key()).unwrap();
    store.install_from_bytes(&data).unwrap();
    assert!(store.load().unwrap().is_mock());
}

#[test]
fn test_encrypted_export_import() {
    let dir = TempDir::new().unwrap();
    let sender = store_in(&dir);
    sender.initialize().unwrap();
    let original = sender.load().unwrap();

    let blob = sender.export_encrypted("cluster-secret").unwrap();

    let recv_dir = TempDir::new().unwrap();
    let receiver = store_in(&recv_dir);
    receiver.import_encrypted(&blob, "cluster-secret").unwrap();
    assert_eq!(receiver.load().unwrap(), original);
}

#[test]
fn test_import_with_wrong_secret_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let sender = store_in(&dir);
    sender.initialize().unwrap();
    let blob = sender.export_encrypted("cluster-secret").unwrap();

    let recv_dir = TempDir::new().unwrap();
    let receiver = store_in(&recv_dir);
    let result = receiver.import_encrypted(&blob, "wrong-secret");

    assert!(matches!(result, Err(StoreError::Crypto(_))));
    assert!(!receiver.exists());
}

#[test]
fn test_backup_written_on_deactivate() {
    let dir = TempDir::new().unwrap();
    let backup = TempDir::new().unwrap();
    let store = KeyStore::new(dir.path().join("priv_validator_key.json"), backup.path());
    store.initialize().unwrap();
    let real = store.load().unwrap();

    store.deactivate().unwrap();

    let bak = backup.path().join("priv_validator_key.json.bak");
    let saved: ValidatorKey = serde_json::from_slice(&std::fs::read(bak).unwrap()).unwrap();
    assert_eq!(saved, real);
}
