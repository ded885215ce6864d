//! Virtual relay: a power switch that can drop off the network.

use localhome_domain::accessory::{
    Accessory, Capability, Characteristic, CharacteristicRef, CharacteristicValue,
};
use localhome_domain::error::HomeError;
use localhome_domain::id::{AccessoryId, CharacteristicId};

use super::{accessory_id, characteristic_id};
use crate::error::VirtualHubError;

/// A simulated smart plug driving the heater.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualRelay {
    on: bool,
    reachable: bool,
}

impl VirtualRelay {
    pub const ACCESSORY_ID: AccessoryId = accessory_id(0x5a1e_0000_0000_4000_8000_0000_0000_0003);
    pub const POWER_ID: CharacteristicId =
        characteristic_id(0x5a1e_0000_0000_4000_8000_0000_0003_0001);
    pub const NAME: &'static str = "Prise relais";

    #[must_use]
    pub fn new(reachable: bool) -> Self {
        Self {
            on: false,
            reachable,
        }
    }

    #[must_use]
    pub fn handle() -> CharacteristicRef {
        CharacteristicRef {
            accessory: Self::ACCESSORY_ID,
            characteristic: Self::POWER_ID,
        }
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    pub fn set_reachable(&mut self, reachable: bool) {
        self.reachable = reachable;
    }

    /// # Errors
    ///
    /// Returns a validation error if the builder fails.
    pub fn accessory(&self) -> Result<Accessory, HomeError> {
        Accessory::builder()
            .id(Self::ACCESSORY_ID)
            .name(Self::NAME)
            .reachable(self.reachable)
            .characteristic(
                Characteristic::new(Capability::PowerState)
                    .with_id(Self::POWER_ID)
                    .with_value(CharacteristicValue::power(self.on)),
            )
            .build()
    }

    /// # Errors
    ///
    /// Returns [`VirtualHubError::Unreachable`] while offline.
    pub fn read(&self, handle: CharacteristicRef) -> Result<CharacteristicValue, VirtualHubError> {
        self.check(handle)?;
        Ok(CharacteristicValue::power(self.on))
    }

    /// # Errors
    ///
    /// Returns [`VirtualHubError::Unreachable`] while offline and
    /// [`VirtualHubError::InvalidValue`] for anything but a power state.
    pub fn write(
        &mut self,
        handle: CharacteristicRef,
        value: CharacteristicValue,
    ) -> Result<(), VirtualHubError> {
        self.check(handle)?;
        self.on = value
            .as_power()
            .map_err(|_| VirtualHubError::InvalidValue { handle, value })?;
        Ok(())
    }

    fn check(&self, handle: CharacteristicRef) -> Result<(), VirtualHubError> {
        if handle != Self::handle() {
            return Err(VirtualHubError::UnknownCharacteristic(handle));
        }
        if !self.reachable {
            return Err(VirtualHubError::Unreachable(Self::ACCESSORY_ID));
        }
        Ok(())
    }
}
