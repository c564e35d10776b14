//! Network lifecycle state

use serde::{Deserialize, Serialize};

/// Lifecycle state of a network.
///
/// `Constructing` covers the window between a create request and the
/// backend returning; `TornDown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkState {
    Constructing,
    Active,
    TornDown,
}

impl NetworkState {
    pub fn accepts_nodes(&self) -> bool {
        matches!(self, NetworkState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NetworkState::TornDown)
    }
}

impl std::fmt::Display for NetworkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkState::Constructing => write!(f, "constructing"),
            NetworkState::Active => write!(f, "active"),
            NetworkState::TornDown => write!(f, "torn_down"),
        }
    }
}
