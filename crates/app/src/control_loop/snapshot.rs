//! Read-only view of the control loop, published over a `watch` channel.

use serde::Serialize;

use localhome_domain::address::HomeAddress;
use localhome_domain::generation::Generation;
use localhome_domain::geo::Coordinate;
use localhome_domain::phase::Phase;
use localhome_domain::thermal::ThermalState;
use localhome_domain::time::{Timestamp, now};

/// A persisted home address that could not be parsed.
///
/// The user is expected to re-enter the address; until then the loop runs
/// without a home location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressIssue {
    pub raw: String,
    pub reason: String,
}

/// Everything presentation layers may show about the loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSnapshot {
    pub phase: Phase,
    pub generation: Generation,
    pub thermal: ThermalState,
    pub humidity: Option<f64>,
    pub home_address: Option<HomeAddress>,
    pub home_coordinate: Option<Coordinate>,
    pub address_issue: Option<AddressIssue>,
    pub position: Option<Coordinate>,
    pub position_place: Option<HomeAddress>,
    pub distance_to_home_m: Option<f64>,
    pub updated_at: Timestamp,
}

impl ControlSnapshot {
    /// Snapshot of a loop that has not bootstrapped yet.
    #[must_use]
    pub fn initial(thermal: ThermalState) -> Self {
        Self {
            phase: Phase::Uninitialized,
            generation: Generation::default(),
            thermal,
            humidity: None,
            home_address: None,
            home_coordinate: None,
            address_issue: None,
            position: None,
            position_place: None,
            distance_to_home_m: None,
            updated_at: now(),
        }
    }

    /// Equality ignoring `updated_at`.
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        let Self {
            phase,
            generation,
            thermal,
            humidity,
            home_address,
            home_coordinate,
            address_issue,
            position,
            position_place,
            distance_to_home_m,
            updated_at: _,
        } = self;
        *phase == other.phase
            && *generation == other.generation
            && *thermal == other.thermal
            && *humidity == other.humidity
            && *home_address == other.home_address
            && *home_coordinate == other.home_coordinate
            && *address_issue == other.address_issue
            && *position == other.position
            && *position_place == other.position_place
            && *distance_to_home_m == other.distance_to_home_m
    }

    #[must_use]
    pub fn relay_on(&self) -> bool {
        self.thermal.relay_on
    }

    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.thermal.current_temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_uninitialized_without_readings() {
        let snapshot = ControlSnapshot::initial(ThermalState::new(20.0).unwrap());
        assert_eq!(snapshot.phase, Phase::Uninitialized);
        assert_eq!(snapshot.temperature(), None);
        assert!(!snapshot.relay_on());
    }

    #[test]
    fn should_ignore_timestamp_when_comparing_state() {
        let first = ControlSnapshot::initial(ThermalState::new(20.0).unwrap());
        let mut second = ControlSnapshot::initial(ThermalState::new(20.0).unwrap());
        assert!(first.same_state(&second));

        second.humidity = Some(40.0);
        assert!(!first.same_state(&second));
    }
}
