//! Event: an immutable record of something the control loop did or saw.
//!
//! Events are informational: presentation layers and logs consume them, the
//! control loop never reads them back.

use serde::{Deserialize, Serialize};

use crate::address::HomeAddress;
use crate::generation::Generation;
use crate::geo::Coordinate;
use crate::phase::Phase;
use crate::rate_limit::Admission;
use crate::rule::Suppression;
use crate::time::{Timestamp, now};

/// Who asked for a relay change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOrigin {
    Rule,
    User,
}

/// Which geocoding direction a request was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeDirection {
    Forward,
    Reverse,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    PhaseChanged {
        from: Phase,
        to: Phase,
        generation: Generation,
    },
    TemperatureUpdated {
        celsius: f64,
        generation: Generation,
    },
    HumidityUpdated {
        percent: f64,
        generation: Generation,
    },
    RelayCommanded {
        on: bool,
        origin: CommandOrigin,
        generation: Generation,
    },
    RuleSuppressed {
        reason: Suppression,
    },
    GeocodeDropped {
        direction: GeocodeDirection,
        admission: Admission,
    },
    AddressNeedsCorrection {
        raw: String,
        error: String,
    },
    HomeLocated {
        address: HomeAddress,
        coordinate: Coordinate,
    },
    PositionResolved {
        coordinate: Coordinate,
        place: HomeAddress,
    },
}

/// A timestamped [`EventKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Stamp `kind` with the current time.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            timestamp: now(),
            kind,
        }
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}
