//! Virtual hub error types.

use localhome_domain::accessory::{CharacteristicRef, CharacteristicValue};
use localhome_domain::error::{HomeError, NotFoundError};
use localhome_domain::id::AccessoryId;

/// Errors raised by the simulated hub.
#[derive(Debug, thiserror::Error)]
pub enum VirtualHubError {
    /// The handle does not point at any simulated characteristic.
    #[error("unknown characteristic {0}")]
    UnknownCharacteristic(CharacteristicRef),

    /// The accessory is currently marked unreachable.
    #[error("accessory {0} is unreachable")]
    Unreachable(AccessoryId),

    /// Sensors cannot be written.
    #[error("characteristic {0} is read-only")]
    ReadOnly(CharacteristicRef),

    /// The written value has the wrong type for the characteristic.
    #[error("cannot write {value:?} to {handle}")]
    InvalidValue {
        handle: CharacteristicRef,
        value: CharacteristicValue,
    },
}

impl From<VirtualHubError> for HomeError {
    fn from(err: VirtualHubError) -> Self {
        match err {
            VirtualHubError::UnknownCharacteristic(handle) => NotFoundError {
                entity: "Characteristic",
                id: handle.to_string(),
            }
            .into(),
            VirtualHubError::Unreachable(accessory) => Self::Unreachable(accessory),
            other => Self::transport(other),
        }
    }
}
