//! Last-signed state file management.
//!
//! The state file is shared with the validator, so every write is an
//! atomic replace (`<path>.tmp` + rename) with mode 0600, mirrored
//! best-effort into the backup directory. Exclusive ownership across the
//! node pair is arbitrated by a `<path>.lock` file created with
//! `O_CREAT|O_EXCL`.

use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use syncguard_types::ConsensusState;
use tracing::{debug, warn};

/// Name of the best-effort backup copy inside the backup directory.
const STATE_BACKUP_NAME: &str = "priv_validator_state.json.bak";

struct StateInner {
    current: Option<ConsensusState>,
    lock_held: bool,
}

/// Manages `priv_validator_state.json` and its lockfile.
pub struct StateStore {
    state_path: PathBuf,
    backup_dir: Option<PathBuf>,
    inner: RwLock<StateInner>,
}

impl StateStore {
    /// Create a store over the given state file. `backup_dir` may be empty
    /// to disable backups.
    pub fn new(state_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        let backup_dir: PathBuf = backup_dir.into();
        Self {
            state_path: state_path.into(),
            backup_dir: if backup_dir.as_os_str().is_empty() {
                None
            } else {
                Some(backup_dir)
            },
            inner: RwLock::new(StateInner {
                current: None,
                lock_held: false,
            }),
        }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.state_path
    }

    fn lock_path(&self) -> PathBuf {
        sibling(&self.state_path, ".lock")
    }

    /// Read and parse the state file, refreshing the cached copy.
    pub fn load_state(&self) -> StoreResult<ConsensusState> {
        let mut inner = self.inner.write();
        let state = self.read_state_file()?;
        inner.current = Some(state.clone());
        Ok(state)
    }

    /// The most recently loaded or saved state, if any.
    pub fn current_state(&self) -> Option<ConsensusState> {
        self.inner.read().current.clone()
    }

    /// Atomically replace the state file and refresh the cache.
    pub fn save_state(&self, state: &ConsensusState) -> StoreResult<()> {
        let mut inner = self.inner.write();
        self.write_state_file(state)?;
        inner.current = Some(state.clone());
        Ok(())
    }

    /// Acquire the exclusive state lock by creating `<path>.lock` with
    /// `O_CREAT|O_EXCL` and writing this process's PID. Not re-entrant:
    /// a second acquisition fails with [`StoreError::AlreadyLocked`].
    pub fn acquire_lock(&self) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let lock_path = self.lock_path();

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&lock_path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyLocked
                } else {
                    StoreError::LockIo {
                        path: lock_path.clone(),
                        source: e,
                    }
                }
            })?;

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            warn!("Failed to write PID to lock file: {}", e);
        }

        inner.lock_held = true;
        debug!("Acquired state lock at {:?}", lock_path);
        Ok(())
    }

    /// Release the state lock. A no-op when this store holds no lock.
    pub fn release_lock(&self) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if !inner.lock_held {
            return Ok(());
        }

        let lock_path = self.lock_path();
        match std::fs::remove_file(&lock_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StoreError::LockIo {
                    path: lock_path,
                    source: e,
                })
            }
        }

        inner.lock_held = false;
        debug!("Released state lock at {:?}", lock_path);
        Ok(())
    }

    /// Whether this store currently holds the state lock.
    pub fn holds_lock(&self) -> bool {
        self.inner.read().lock_held
    }

    /// Check whether it is safe to take over signing duties: true only
    /// when `local` is strictly ahead of `remote` in the
    /// `(height, round, step)` ordering.
    pub fn compare_states(local: &ConsensusState, remote: &ConsensusState) -> StoreResult<()> {
        if local.is_ahead_of(remote) {
            Ok(())
        } else {
            Err(StoreError::RemoteAhead {
                local_height: local.height,
                local_round: local.round,
                local_step: local.step,
                remote_height: remote.height,
                remote_round: remote.round,
                remote_step: remote.step,
            })
        }
    }

    /// Adopt the remote state if it is at or ahead of the local state
    /// (step equality allowed so a tracking node can advance through
    /// consensus steps). A remote state strictly behind local is refused
    /// with [`StoreError::BehindRemote`] and the file is left untouched.
    pub fn sync_from_remote(&self, remote: &ConsensusState) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let local = self.read_state_file()?;

        if !remote.is_at_or_ahead_of(&local) {
            return Err(StoreError::BehindRemote {
                local_height: local.height,
                local_round: local.round,
                local_step: local.step,
                remote_height: remote.height,
                remote_round: remote.round,
                remote_step: remote.step,
            });
        }

        self.write_state_file(remote)?;
        inner.current = Some(remote.clone());
        Ok(())
    }

    fn read_state_file(&self) -> StoreResult<ConsensusState> {
        let data = std::fs::read(&self.state_path).map_err(|e| StoreError::FileRead {
            path: self.state_path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn write_state_file(&self, state: &ConsensusState) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(state)?;
        write_atomic(&self.state_path, &data)?;

        if let Some(dir) = &self.backup_dir {
            let backup = dir.join(STATE_BACKUP_NAME);
            if let Err(e) = write_private(&backup, &data) {
                warn!("Failed to write backup state to {:?}: {}", backup, e);
            }
        }

        Ok(())
    }
}

/// Append a suffix to a path, keeping its extension
/// (`priv_validator_state.json` -> `priv_validator_state.json.lock`).
pub(crate) fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// Write `data` to `<path>.tmp` with mode 0600, then atomically rename
/// over `path`.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> StoreResult<()> {
    let tmp = sibling(path, ".tmp");
    write_private(&tmp, data).map_err(|e| StoreError::FileWrite {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| StoreError::Rename {
        from: tmp,
        to: path.to_path_buf(),
        source: e,
    })
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)
}
