//! Simulated accessories: thermometer, hygrometer, relay.
//!
//! Each device has fixed accessory and characteristic identifiers so
//! explicit role mappings in the configuration stay valid across restarts.

mod hygrometer;
mod relay;
mod thermometer;

pub use hygrometer::VirtualHygrometer;
pub use relay::VirtualRelay;
pub use thermometer::VirtualThermometer;

use localhome_domain::accessory::{Accessory, CharacteristicRef, CharacteristicValue};
use localhome_domain::error::HomeError;
use localhome_domain::id::{AccessoryId, CharacteristicId};

use crate::error::VirtualHubError;

/// Build an accessory id from a fixed 128-bit value.
pub(crate) const fn accessory_id(raw: u128) -> AccessoryId {
    AccessoryId::from_uuid(uuid::Uuid::from_u128(raw))
}

/// Build a characteristic id from a fixed 128-bit value.
pub(crate) const fn characteristic_id(raw: u128) -> CharacteristicId {
    CharacteristicId::from_uuid(uuid::Uuid::from_u128(raw))
}

/// Wrapper enum for the concrete virtual device types.
pub enum VirtualDevice {
    Thermometer(VirtualThermometer),
    Hygrometer(VirtualHygrometer),
    Relay(VirtualRelay),
}

impl VirtualDevice {
    #[must_use]
    pub fn id(&self) -> AccessoryId {
        match self {
            Self::Thermometer(_) => VirtualThermometer::ACCESSORY_ID,
            Self::Hygrometer(_) => VirtualHygrometer::ACCESSORY_ID,
            Self::Relay(_) => VirtualRelay::ACCESSORY_ID,
        }
    }

    /// Describe the device as the hub would list it.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the builder fails.
    pub fn accessory(&self) -> Result<Accessory, HomeError> {
        match self {
            Self::Thermometer(d) => d.accessory(),
            Self::Hygrometer(d) => d.accessory(),
            Self::Relay(d) => d.accessory(),
        }
    }

    /// Current value of one of this device's characteristics.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualHubError::UnknownCharacteristic`] for a foreign handle
    /// and [`VirtualHubError::Unreachable`] for an offline relay.
    pub fn read(&self, handle: CharacteristicRef) -> Result<CharacteristicValue, VirtualHubError> {
        match self {
            Self::Thermometer(d) => d.read(handle),
            Self::Hygrometer(d) => d.read(handle),
            Self::Relay(d) => d.read(handle),
        }
    }
}
