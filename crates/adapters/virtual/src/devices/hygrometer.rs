//! Virtual hygrometer: a constant relative humidity.

use localhome_domain::accessory::{
    Accessory, Capability, Characteristic, CharacteristicRef, CharacteristicValue,
};
use localhome_domain::error::HomeError;
use localhome_domain::id::{AccessoryId, CharacteristicId};

use super::{accessory_id, characteristic_id};
use crate::error::VirtualHubError;

/// A simulated hygrometer.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualHygrometer {
    percent: f64,
}

impl VirtualHygrometer {
    pub const ACCESSORY_ID: AccessoryId = accessory_id(0x5a1e_0000_0000_4000_8000_0000_0000_0002);
    pub const HUMIDITY_ID: CharacteristicId =
        characteristic_id(0x5a1e_0000_0000_4000_8000_0000_0002_0001);
    pub const NAME: &'static str = "Salon hum";

    #[must_use]
    pub fn new(percent: f64) -> Self {
        Self { percent }
    }

    #[must_use]
    pub fn handle() -> CharacteristicRef {
        CharacteristicRef {
            accessory: Self::ACCESSORY_ID,
            characteristic: Self::HUMIDITY_ID,
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
                Characteristic::new(Capability::CurrentRelativeHumidity)
                    .with_id(Self::HUMIDITY_ID)
                    .with_value(CharacteristicValue::Float(self.percent)),
            )
            .build()
    }

    /// # Errors
    ///
    /// Returns [`VirtualHubError::UnknownCharacteristic`] for a foreign handle.
    pub fn read(&self, handle: CharacteristicRef) -> Result<CharacteristicValue, VirtualHubError> {
        if handle == Self::handle() {
            Ok(CharacteristicValue::Float(self.percent))
        } else {
            Err(VirtualHubError::UnknownCharacteristic(handle))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_configured_humidity() {
        let hygrometer = VirtualHygrometer::new(52.0);
        assert_eq!(
            hygrometer.read(VirtualHygrometer::handle()).unwrap(),
            CharacteristicValue::Float(52.0)
        );
    }

    #[test]
    fn should_expose_humidity_characteristic() {
        let accessory = VirtualHygrometer::new(52.0).accessory().unwrap();
        assert_eq!(accessory.name, VirtualHygrometer::NAME);
        assert!(
            accessory
                .characteristic(&Capability::CurrentRelativeHumidity)
                .is_some()
        );
    }
}
