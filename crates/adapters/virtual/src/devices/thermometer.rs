//! Virtual thermometer: a temperature that follows the relay.

use localhome_domain::accessory::{
    Accessory, Capability, Characteristic, CharacteristicRef, CharacteristicValue,
};
use localhome_domain::error::HomeError;
use localhome_domain::id::{AccessoryId, CharacteristicId};

use super::{accessory_id, characteristic_id};
use crate::config::VirtualHubConfig;
use crate::error::VirtualHubError;

/// A simulated room thermometer.
///
/// Every [`step`](Self::step) warms the room while the heater is on and
/// cools it towards the ambient floor otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualThermometer {
    celsius: f64,
    heating_step: f64,
    cooling_step: f64,
    ambient: f64,
}

impl VirtualThermometer {
    pub const ACCESSORY_ID: AccessoryId = accessory_id(0x5a1e_0000_0000_4000_8000_0000_0000_0001);
    pub const TEMPERATURE_ID: CharacteristicId =
        characteristic_id(0x5a1e_0000_0000_4000_8000_0000_0001_0001);
    pub const NAME: &'static str = "Salon temp";

    #[must_use]
    pub fn new(config: &VirtualHubConfig) -> Self {
        Self {
            celsius: config.initial_temperature,
            heating_step: config.heating_step,
            cooling_step: config.cooling_step,
            ambient: config.ambient_temperature,
        }
    }

    #[must_use]
    pub fn handle() -> CharacteristicRef {
        CharacteristicRef {
            accessory: Self::ACCESSORY_ID,
            characteristic: Self::TEMPERATURE_ID,
        }
    }

    #[must_use]
    pub fn celsius(&self) -> f64 {
        self.celsius
    }

    pub fn set_celsius(&mut self, celsius: f64) {
        self.celsius = celsius;
    }

    /// Advance the simulation by one read.
    pub fn step(&mut self, heating: bool) {
        if heating {
            self.celsius += self.heating_step;
        } else {
            self.celsius = (self.celsius - self.cooling_step).max(self.ambient);
        }
    }

    /// # Errors
    ///
    /// Returns a validation error if the builder fails.
    pub fn accessory(&self) -> Result<Accessory, HomeError> {
        Accessory::builder()
            .id(Self::ACCESSORY_ID)
            .name(Self::NAME)
            .characteristic(
                Characteristic::new(Capability::CurrentTemperature)
                    .with_id(Self::TEMPERATURE_ID)
                    .with_value(CharacteristicValue::Float(self.celsius)),
            )
            .build()
    }

    /// # Errors
    ///
    /// Returns [`VirtualHubError::UnknownCharacteristic`] for a foreign handle.
    pub fn read(&self, handle: CharacteristicRef) -> Result<CharacteristicValue, VirtualHubError> {
        if handle == Self::handle() {
            Ok(CharacteristicValue::Float(self.celsius))
        } else {
            Err(VirtualHubError::UnknownCharacteristic(handle))
        }
    }
}
