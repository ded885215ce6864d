//! Discovery generations.
//!
//! Every (re)discovery starts a new generation. Asynchronous work is tagged
//! with the generation it was issued under so completions from a superseded
//! connection can be told apart and dropped.

use serde::{Deserialize, Serialize};

/// Monotonic reconnect counter. `Generation::default()` is the state before
/// the first discovery.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    /// The generation following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    /// Whether work issued under `self` is still current relative to `current`.
    #[must_use]
    pub fn is_current(self, current: Self) -> bool {
        self == current
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
