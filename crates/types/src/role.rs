//! Runtime node role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether this node currently holds signing duties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Holds the real key and signs.
    Active,
    /// Holds the mock key (or none) and tracks state.
    Passive,
}

impl NodeRole {
    pub fn is_active(self) -> bool {
        matches!(self, NodeRole::Active)
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Active => write!(f, "active"),
            NodeRole::Passive => write!(f, "passive"),
        }
    }
}

impl FromStr for NodeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(NodeRole::Active),
            "passive" => Ok(NodeRole::Passive),
            other => Err(format!("must be 'active' or 'passive', got '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!("active".parse::<NodeRole>().unwrap(), NodeRole::Active);
        assert_eq!("passive".parse::<NodeRole>().unwrap(), NodeRole::Passive);
        assert!("primary".parse::<NodeRole>().is_err());
    }
}
