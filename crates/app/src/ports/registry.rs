//! Accessory registry port: the hub the controller talks to.
//!
//! The registry is opaque: the core only discovers accessories, reads and
//! writes characteristics, and listens for accessory-level changes. Every
//! call to [`discover`](AccessoryRegistry::discover) is treated as a fresh
//! connection, so handles from earlier discoveries must not be reused.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;

use localhome_domain::accessory::{
    Accessory, AccessoryChange, CharacteristicRef, CharacteristicValue,
};
use localhome_domain::error::HomeError;

/// A home-automation hub exposing accessories and their characteristics.
///
/// Implementations live in adapter crates (e.g. `adapter_virtual`).
pub trait AccessoryRegistry: Send + Sync {
    /// (Re)connect to the hub and list every accessory it knows.
    fn discover(&self) -> impl Future<Output = Result<Vec<Accessory>, HomeError>> + Send;

    /// Read the current value of one characteristic.
    fn read(
        &self,
        handle: CharacteristicRef,
    ) -> impl Future<Output = Result<CharacteristicValue, HomeError>> + Send;

    /// Write a value to one characteristic.
    fn write(
        &self,
        handle: CharacteristicRef,
        value: CharacteristicValue,
    ) -> impl Future<Output = Result<(), HomeError>> + Send;

    /// Subscribe to accessory-level change notifications.
    ///
    /// Returns a receiver that gets all changes emitted *after* the call.
    fn subscribe(&self) -> broadcast::Receiver<AccessoryChange>;
}

impl<T: AccessoryRegistry> AccessoryRegistry for Arc<T> {
    fn discover(&self) -> impl Future<Output = Result<Vec<Accessory>, HomeError>> + Send {
        (**self).discover()
    }

    fn read(
        &self,
        handle: CharacteristicRef,
    ) -> impl Future<Output = Result<CharacteristicValue, HomeError>> + Send {
        (**self).read(handle)
    }

    fn write(
        &self,
        handle: CharacteristicRef,
        value: CharacteristicValue,
    ) -> impl Future<Output = Result<(), HomeError>> + Send {
        (**self).write(handle, value)
    }

    fn subscribe(&self) -> broadcast::Receiver<AccessoryChange> {
        (**self).subscribe()
    }
}
