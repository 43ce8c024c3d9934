//! Validator key file management.
//!
//! The key store never inspects private key bytes: keys move as whole
//! files. Deactivation swaps the real key to a `<path>.real` sidecar and
//! writes the fixed mock key in its place, so a restarted validator boots
//! but cannot sign on the real chain.

use crate::error::{StoreError, StoreResult};
use crate::state::{sibling, write_atomic};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use syncguard_crypto::cipher;
use syncguard_types::{mock_key, ValidatorKey};
use tracing::{info, warn};

/// Name of the best-effort backup copy inside the backup directory.
const KEY_BACKUP_NAME: &str = "priv_validator_key.json.bak";

/// Manages `priv_validator_key.json` and its sidecars.
pub struct KeyStore {
    key_path: PathBuf,
    backup_dir: Option<PathBuf>,
    // Serializes all file mutation on this store.
    op_lock: Mutex<()>,
}

impl KeyStore {
    /// Create a store over the given key file. `backup_dir` may be empty
    /// to disable backups.
    pub fn new(key_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        let backup_dir: PathBuf = backup_dir.into();
        Self {
            key_path: key_path.into(),
            backup_dir: if backup_dir.as_os_str().is_empty() {
                None
            } else {
                Some(backup_dir)
            },
            op_lock: Mutex::new(()),
        }
    }

    /// Path of the key file.
    pub fn path(&self) -> &Path {
        &self.key_path
    }

    fn real_path(&self) -> PathBuf {
        sibling(&self.key_path, ".real")
    }

    fn disabled_path(&self) -> PathBuf {
        sibling(&self.key_path, ".disabled")
    }

    /// Read and parse the key file.
    pub fn load(&self) -> StoreResult<ValidatorKey> {
        let data = std::fs::read(&self.key_path).map_err(|e| StoreError::FileRead {
            path: self.key_path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Atomically write the key file.
    pub fn save(&self, key: &ValidatorKey) -> StoreResult<()> {
        let _guard = self.op_lock.lock();
        self.save_locked(key)
    }

    fn save_locked(&self, key: &ValidatorKey) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(key)?;
        write_atomic(&self.key_path, &data)
    }

    /// Copy the current key into the backup directory. A no-op when no
    /// backup directory is configured.
    pub fn backup(&self) -> StoreResult<()> {
        let Some(dir) = &self.backup_dir else {
            return Ok(());
        };

        let key = self.load()?;
        let data = serde_json::to_vec_pretty(&key)?;
        let backup = dir.join(KEY_BACKUP_NAME);
        write_atomic(&backup, &data)
    }

    /// Generate a fresh key file if none exists yet.
    pub fn initialize(&self) -> StoreResult<()> {
        let _guard = self.op_lock.lock();

        if self.key_path.exists() {
            info!("Key found, using existing file: {:?}", self.key_path);
            return Ok(());
        }

        info!("Key not found, generating new key: {:?}", self.key_path);
        let key = syncguard_crypto::generate_validator_key();

        if let Some(dir) = self.key_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::FileWrite {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        self.save_locked(&key)?;
        info!("Generated new validator key with address: {}", key.address);
        Ok(())
    }

    /// Disable signing: back up, move the real key to `<path>.real`, and
    /// write the mock key in its place. A failure after the rename rolls
    /// the real key back so the file is never left missing.
    pub fn deactivate(&self) -> StoreResult<()> {
        let _guard = self.op_lock.lock();

        if let Err(e) = self.backup() {
            warn!("Failed to back up key before deactivation: {}", e);
        }

        let real_path = self.real_path();
        std::fs::rename(&self.key_path, &real_path).map_err(|e| StoreError::Rename {
            from: self.key_path.clone(),
            to: real_path.clone(),
            source: e,
        })?;

        if let Err(e) = self.save_locked(&mock_key()) {
            if let Err(rollback) = std::fs::rename(&real_path, &self.key_path) {
                warn!("Rollback of key deactivation failed: {}", rollback);
            }
            return Err(e);
        }

        Ok(())
    }

    /// Restore the real key from `<path>.real` (mock swap) or the legacy
    /// `<path>.disabled` sidecar.
    pub fn restore(&self) -> StoreResult<()> {
        let _guard = self.op_lock.lock();

        let real_path = self.real_path();
        if real_path.exists() {
            match std::fs::remove_file(&self.key_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StoreError::FileWrite {
                        path: self.key_path.clone(),
                        source: e,
                    })
                }
            }
            return std::fs::rename(&real_path, &self.key_path).map_err(|e| StoreError::Rename {
                from: real_path,
                to: self.key_path.clone(),
                source: e,
            });
        }

        let disabled_path = self.disabled_path();
        if !disabled_path.exists() {
            return Err(StoreError::NoKeyToRestore);
        }
        std::fs::rename(&disabled_path, &self.key_path).map_err(|e| StoreError::Rename {
            from: disabled_path,
            to: self.key_path.clone(),
            source: e,
        })
    }

    /// Whether the key file exists.
    pub fn exists(&self) -> bool {
        self.key_path.exists()
    }

    /// Raw key file contents, for transfer to the peer.
    pub fn bytes(&self) -> StoreResult<Vec<u8>> {
        std::fs::read(&self.key_path).map_err(|e| StoreError::FileRead {
            path: self.key_path.clone(),
            source: e,
        })
    }

    /// Validate received bytes as a key file and install them.
    pub fn install_from_bytes(&self, data: &[u8]) -> StoreResult<()> {
        let key: ValidatorKey =
            serde_json::from_slice(data).map_err(|source| StoreError::InvalidKey { source })?;
        self.save(&key)
    }

    /// Key file contents encrypted for transport with the cluster secret.
    pub fn export_encrypted(&self, secret: &str) -> StoreResult<Vec<u8>> {
        let data = self.bytes()?;
        Ok(cipher::encrypt(&data, secret)?)
    }

    /// Decrypt a transport blob and install the contained key. Decryption
    /// failure leaves the disk untouched.
    pub fn import_encrypted(&self, blob: &[u8], secret: &str) -> StoreResult<()> {
        let data = cipher::decrypt(blob, secret)?;
        self.install_from_bytes(&data)
    }
}
