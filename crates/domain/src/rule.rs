//! Threshold rule: the control law from temperature to relay state.
//!
//! There is no deadband: a temperature exactly at the threshold turns the
//! relay off.

use serde::{Deserialize, Serialize};

use crate::thermal::{Reading, ThermalState};

/// Why the rule chose not to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suppression {
    RelayUnreachable,
    TemperatureUnavailable,
}

impl std::fmt::Display for Suppression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelayUnreachable => f.write_str("relay not reachable"),
            Self::TemperatureUnavailable => f.write_str("temperature unavailable"),
        }
    }
}

/// Outcome of one rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    TurnOn,
    TurnOff,
    NoAction(Suppression),
}

impl Decision {
    /// Desired relay state, if the decision actuates.
    #[must_use]
    pub fn desired_power(self) -> Option<bool> {
        match self {
            Self::TurnOn => Some(true),
            Self::TurnOff => Some(false),
            Self::NoAction(_) => None,
        }
    }
}

/// Decide what the relay should do.
#[must_use]
pub fn decide(current: Reading, threshold: f64, relay_reachable: bool) -> Decision {
    if !relay_reachable {
        return Decision::NoAction(Suppression::RelayUnreachable);
    }
    match current {
        Reading::Unavailable => Decision::NoAction(Suppression::TemperatureUnavailable),
        Reading::Value(temp) if temp < threshold => Decision::TurnOn,
        Reading::Value(_) => Decision::TurnOff,
    }
}

/// Evaluate the rule against a [`ThermalState`].
#[must_use]
pub fn evaluate(state: &ThermalState) -> Decision {
    decide(state.temperature(), state.threshold, state.relay_reachable)
}
