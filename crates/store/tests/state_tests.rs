//! Tests for the state store: persistence, locking, and the safety
//! comparators.

use std::os::unix::fs::PermissionsExt;
use syncguard_store::{StateStore, StoreError};
use syncguard_types::ConsensusState;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> StateStore {
    StateStore::new(dir.path().join("priv_validator_state.json"), "")
}

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let state = ConsensusState::at(1000, 1, 3);
    store.save_state(&state).unwrap();

    let loaded = store.load_state().unwrap();
    assert_eq!(loaded, state);
    assert_eq!(store.current_state(), Some(state));
}

#[test]
fn test_state_file_mode_and_no_tmp_left_behind() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save_state(&ConsensusState::at(1, 0, 0)).unwrap();

    let path = dir.path().join("priv_validator_state.json");
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert!(!dir.path().join("priv_validator_state.json.tmp").exists());
}

#[test]
fn test_backup_copy_written() {
    let dir = TempDir::new().unwrap();
    let backup = TempDir::new().unwrap();
    let store = StateStore::new(
        dir.path().join("priv_validator_state.json"),
        backup.path(),
    );

    store.save_state(&ConsensusState::at(42, 0, 1)).unwrap();

    let bak = backup.path().join("priv_validator_state.json.bak");
    let copied: ConsensusState =
        serde_json::from_slice(&std::fs::read(bak).unwrap()).unwrap();
    assert_eq!(copied.position(), (42, 0, 1));
}

#[test]
fn test_lock_mutual_exclusion() {
    let dir = TempDir::new().unwrap();
    let a = store_in(&dir);
    let b = store_in(&dir);

    a.acquire_lock().unwrap();
    assert!(a.holds_lock());

    // Second acquisition fails, from any store over the same file.
    assert!(matches!(b.acquire_lock(), Err(StoreError::AlreadyLocked)));
    assert!(matches!(a.acquire_lock(), Err(StoreError::AlreadyLocked)));

    a.release_lock().unwrap();
    b.acquire_lock().unwrap();
    b.release_lock().unwrap();
}

#[test]
fn test_release_without_lock_is_noop() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.release_lock().unwrap();
    store.release_lock().unwrap();
}

#[test]
fn test_lock_file_records_pid() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.acquire_lock().unwrap();

    let contents =
        std::fs::read_to_string(dir.path().join("priv_validator_state.json.lock")).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());

    store.release_lock().unwrap();
}

#[test]
fn test_compare_states_boundaries() {
    // (local, remote, can take over)
    let cases = [
        ((1000, 0, 1), (999, 0, 1), true),
        ((999, 0, 1), (1000, 0, 1), false),
        ((1000, 2, 1), (1000, 1, 1), true),
        ((1000, 1, 1), (1000, 2, 1), false),
        ((1000, 1, 3), (1000, 1, 2), true),
        ((1000, 1, 2), (1000, 1, 3), false),
    ];

    for ((lh, lr, ls), (rh, rr, rs), can_take_over) in cases {
        let local = ConsensusState::at(lh, lr, ls);
        let remote = ConsensusState::at(rh, rr, rs);
        assert_eq!(
            StateStore::compare_states(&local, &remote).is_ok(),
            can_take_over,
            "local={:?} remote={:?}",
            local.position(),
            remote.position()
        );
    }

    // Equal positions: not safe to take over.
    let equal = ConsensusState::at(1000, 1, 2);
    assert!(StateStore::compare_states(&equal, &equal.clone()).is_err());
}

#[test]
fn test_sync_adopts_remote_ahead() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save_state(&ConsensusState::at(1000, 0, 1)).unwrap();

    store.sync_from_remote(&ConsensusState::at(1000, 0, 2)).unwrap();
    store.sync_from_remote(&ConsensusState::at(1001, 0, 1)).unwrap();
    // Step equality is allowed so the tracker can hold position.
    store.sync_from_remote(&ConsensusState::at(1001, 0, 1)).unwrap();

    assert_eq!(store.load_state().unwrap().position(), (1001, 0, 1));
}

#[test]
fn test_sync_refuses_rollback() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save_state(&ConsensusState::at(1000, 1, 3)).unwrap();

    let result = store.sync_from_remote(&ConsensusState::at(999, 0, 1));
    assert!(matches!(result, Err(StoreError::BehindRemote { .. })));

    // The file is unchanged after a refusal.
    assert_eq!(store.load_state().unwrap().position(), (1000, 1, 3));
}
