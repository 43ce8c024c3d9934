//! Last-signed consensus state (`priv_validator_state.json`).
//!
//! The validator persists the `(height, round, step)` position of its last
//! signature so it never signs the same position twice across restarts.
//! SyncGuard reads and writes the same file, so the on-disk encoding must
//! match the validator's exactly: `height` is a decimal string, and the
//! signature fields are omitted when empty.

use serde::{Deserialize, Serialize};

/// The last-signed consensus position plus the signature artifacts.
///
/// Ordering for all safety decisions is lexicographic over
/// `(height, round, step)`; the signature fields never participate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    /// Block height, serialized as a decimal string for wire compatibility.
    #[serde(with = "decimal_string")]
    pub height: u64,

    /// Consensus round within the height.
    pub round: i32,

    /// Consensus step within the round (propose / prevote / precommit).
    pub step: i8,

    /// Base64 signature of the last signed message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Base64 bytes that were signed, if any.
    #[serde(default, rename = "signbytes", skip_serializing_if = "Option::is_none")]
    pub sign_bytes: Option<String>,
}

impl ConsensusState {
    /// Create a state at the given position with no signature artifacts.
    pub fn at(height: u64, round: i32, step: i8) -> Self {
        Self {
            height,
            round,
            step,
            signature: None,
            sign_bytes: None,
        }
    }

    /// The comparable `(height, round, step)` position.
    pub fn position(&self) -> (u64, i32, i8) {
        (self.height, self.round, self.step)
    }

    /// True iff `self` is strictly ahead of `other` in the
    /// `(height, round, step)` ordering.
    ///
    /// This is the take-over predicate: a node may only claim signing
    /// duties when its own state is strictly ahead of the peer's.
    pub fn is_ahead_of(&self, other: &Self) -> bool {
        self.position() > other.position()
    }

    /// True iff `self` is at or ahead of `other` in the
    /// `(height, round, step)` ordering.
    ///
    /// This is the adoption predicate: a passive node tracking the active
    /// one accepts a remote state that is ahead, or equal on step so it can
    /// advance through consensus steps.
    pub fn is_at_or_ahead_of(&self, other: &Self) -> bool {
        self.position() >= other.position()
    }
}

/// Serialize/deserialize a `u64` as a decimal string, matching the
/// validator's JSON encoding of heights.
mod decimal_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse::<u64>()
            .map_err(|_| de::Error::custom(format!("invalid height {:?}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_round_trips_as_string() {
        let state = ConsensusState::at(12345, 2, 3);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"height\":\"12345\""));

        let parsed: ConsensusState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn empty_signature_fields_are_omitted() {
        let state = ConsensusState::at(1, 0, 0);
        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("signature"));
        assert!(!json.contains("signbytes"));
    }
}
