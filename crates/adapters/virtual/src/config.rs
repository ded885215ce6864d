//! Virtual hub configuration.

use serde::Deserialize;

/// Starting values and simulation steps for the virtual hub.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualHubConfig {
    /// Temperature reported before any simulation step, in °C.
    pub initial_temperature: f64,
    /// Relative humidity reported by the hygrometer, in %.
    pub initial_humidity: f64,
    /// Warming per temperature read while the relay is on, in °C.
    pub heating_step: f64,
    /// Cooling per temperature read while the relay is off, in °C.
    pub cooling_step: f64,
    /// Floor the room cools down to, in °C.
    pub ambient_temperature: f64,
    /// Whether the relay starts reachable.
    pub relay_reachable: bool,
}

impl Default for VirtualHubConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 18.5,
            initial_humidity: 45.0,
            heating_step: 0.5,
            cooling_step: 0.25,
            ambient_temperature: 16.0,
            relay_reachable: true,
        }
    }
}
