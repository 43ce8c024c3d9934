//! Tests for the consensus state ordering and encoding.

use syncguard_types::ConsensusState;

#[test]
fn test_ordering_boundaries() {
    // (local, remote, local strictly ahead)
    let cases = [
        (ConsensusState::at(1000, 0, 1), ConsensusState::at(999, 0, 1), true),
        (ConsensusState::at(999, 0, 1), ConsensusState::at(1000, 0, 1), false),
        (ConsensusState::at(1000, 2, 1), ConsensusState::at(1000, 1, 1), true),
        (ConsensusState::at(1000, 1, 1), ConsensusState::at(1000, 2, 1), false),
        (ConsensusState::at(1000, 1, 3), ConsensusState::at(1000, 1, 2), true),
        (ConsensusState::at(1000, 1, 2), ConsensusState::at(1000, 1, 3), false),
    ];

    for (local, remote, ahead) in cases {
        assert_eq!(
            local.is_ahead_of(&remote),
            ahead,
            "local={:?} remote={:?}",
            local.position(),
            remote.position()
        );
    }
}

#[test]
fn test_equal_positions_are_at_or_ahead() {
    let a = ConsensusState::at(500, 3, 2);
    let b = ConsensusState::at(500, 3, 2);
    assert!(!a.is_ahead_of(&b));
    assert!(a.is_at_or_ahead_of(&b));
}

#[test]
fn test_disk_format_matches_validator() {
    let raw = r#"{
        "height": "1043",
        "round": 0,
        "step": 3,
        "signature": "c2ln",
        "signbytes": "Ynl0ZXM="
    }"#;

    let state: ConsensusState = serde_json::from_str(raw).unwrap();
    assert_eq!(state.height, 1043);
    assert_eq!(state.round, 0);
    assert_eq!(state.step, 3);
    assert_eq!(state.signature.as_deref(), Some("c2ln"));
    assert_eq!(state.sign_bytes.as_deref(), Some("Ynl0ZXM="));

    let encoded = serde_json::to_value(&state).unwrap();
    assert_eq!(encoded["height"], "1043");
    assert_eq!(encoded["signbytes"], "Ynl0ZXM=");
}

#[test]
fn test_fresh_state_file_parses() {
    // A validator that has never signed writes height "0" with no
    // signature fields.
    let raw = r#"{"height": "0", "round": 0, "step": 0}"#;
    let state: ConsensusState = serde_json::from_str(raw).unwrap();
    assert_eq!(state.position(), (0, 0, 0));
    assert!(state.signature.is_none());
}
