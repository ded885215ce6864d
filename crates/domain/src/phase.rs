//! Control-loop phase.

use serde::{Deserialize, Serialize};

/// Why the loop cannot control the relay right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    DiscoveryFailed,
    NoRelay,
    RelayUnreachable,
    NoThermometer,
}

/// Where the supervisory state machine currently is.
///
/// There is no terminal phase: every reconnect goes back through
/// [`Discovering`](Self::Discovering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Uninitialized,
    Discovering,
    Polling,
    Degraded(DegradedReason),
}

impl Phase {
    #[must_use]
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::Discovering => f.write_str("discovering"),
            Self::Polling => f.write_str("polling"),
            Self::Degraded(reason) => write!(f, "degraded({reason:?})"),
        }
    }
}
