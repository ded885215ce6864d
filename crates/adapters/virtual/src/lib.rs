//! # localhome-adapter-virtual
//!
//! Simulated accessory hub and offline geocoder for testing and demonstration.
//!
//! ## Provided accessories
//!
//! | Accessory | Name | Behaviour |
//! |-----------|------|-----------|
//! | [`VirtualThermometer`] | `Salon temp` | Warms while the relay is on, cools otherwise |
//! | [`VirtualHygrometer`] | `Salon hum` | Constant humidity |
//! | [`VirtualRelay`] | `Prise relais` | Power state, can be taken offline |
//!
//! Names follow the legacy naming convention so the name-based role fallback
//! recognises them; the fixed identifiers work with explicit role mappings.
//!
//! ## Dependency rule
//!
//! Depends on `localhome-app` (port traits) and `localhome-domain` only.

mod config;
mod devices;
mod error;
mod geocoder;

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use localhome_app::ports::AccessoryRegistry;
use localhome_domain::accessory::{
    Accessory, AccessoryChange, CharacteristicRef, CharacteristicValue,
};
use localhome_domain::error::HomeError;
use localhome_domain::role::{AccessoryRole, RoleMap};

pub use config::VirtualHubConfig;
pub use devices::{VirtualDevice, VirtualHygrometer, VirtualRelay, VirtualThermometer};
pub use error::VirtualHubError;
pub use geocoder::{Place, VirtualGeocoder};

const CHANGE_CAPACITY: usize = 16;

struct HubState {
    thermometer: VirtualThermometer,
    hygrometer: VirtualHygrometer,
    relay: VirtualRelay,
}

impl HubState {
    fn devices(&self) -> [VirtualDevice; 3] {
        [
            VirtualDevice::Thermometer(self.thermometer.clone()),
            VirtualDevice::Hygrometer(self.hygrometer.clone()),
            VirtualDevice::Relay(self.relay.clone()),
        ]
    }
}

/// A hub with one thermometer, one hygrometer and one relay.
pub struct VirtualHub {
    state: Mutex<HubState>,
    changes: broadcast::Sender<AccessoryChange>,
}

impl Default for VirtualHub {
    fn default() -> Self {
        Self::new(&VirtualHubConfig::default())
    }
}

impl VirtualHub {
    #[must_use]
    pub fn new(config: &VirtualHubConfig) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            state: Mutex::new(HubState {
                thermometer: VirtualThermometer::new(config),
                hygrometer: VirtualHygrometer::new(config.initial_humidity),
                relay: VirtualRelay::new(config.relay_reachable),
            }),
            changes,
        }
    }

    /// Explicit role mapping for the simulated accessories.
    #[must_use]
    pub fn roles() -> RoleMap {
        RoleMap::new()
            .with(VirtualThermometer::ACCESSORY_ID, AccessoryRole::Thermometer)
            .with(VirtualHygrometer::ACCESSORY_ID, AccessoryRole::Hygrometer)
            .with(VirtualRelay::ACCESSORY_ID, AccessoryRole::Relay)
    }

    /// Take the relay on or off the network and notify subscribers.
    pub fn set_relay_reachable(&self, reachable: bool) {
        self.lock().relay.set_reachable(reachable);
        tracing::info!(reachable, "virtual relay reachability changed");
        let _ = self.changes.send(AccessoryChange::Reachability {
            accessory: VirtualRelay::ACCESSORY_ID,
            reachable,
        });
    }

    /// Force the simulated room temperature.
    pub fn set_temperature(&self, celsius: f64) {
        self.lock().thermometer.set_celsius(celsius);
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.lock().thermometer.celsius()
    }

    #[must_use]
    pub fn relay_on(&self) -> bool {
        self.lock().relay.is_on()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_value(&self, handle: CharacteristicRef) -> Result<CharacteristicValue, VirtualHubError> {
        let mut state = self.lock();
        if handle == VirtualThermometer::handle() {
            let heating = state.relay.is_on();
            state.thermometer.step(heating);
        }
        state
            .devices()
            .iter()
            .find(|device| device.id() == handle.accessory)
            .ok_or(VirtualHubError::UnknownCharacteristic(handle))?
            .read(handle)
    }

    fn write_value(
        &self,
        handle: CharacteristicRef,
        value: CharacteristicValue,
    ) -> Result<(), VirtualHubError> {
        let mut state = self.lock();
        match handle.accessory {
            id if id == VirtualRelay::ACCESSORY_ID => state.relay.write(handle, value),
            id if id == VirtualThermometer::ACCESSORY_ID || id == VirtualHygrometer::ACCESSORY_ID => {
                Err(VirtualHubError::ReadOnly(handle))
            }
            _ => Err(VirtualHubError::UnknownCharacteristic(handle)),
        }
    }
}

impl AccessoryRegistry for VirtualHub {
    async fn discover(&self) -> Result<Vec<Accessory>, HomeError> {
        let devices = self.lock().devices();
        devices.iter().map(VirtualDevice::accessory).collect()
    }

    async fn read(&self, handle: CharacteristicRef) -> Result<CharacteristicValue, HomeError> {
        Ok(self.read_value(handle)?)
    }

    async fn write(
        &self,
        handle: CharacteristicRef,
        value: CharacteristicValue,
    ) -> Result<(), HomeError> {
        self.write_value(handle, value.clone())?;
        tracing::debug!(%handle, ?value, "virtual write applied");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AccessoryChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localhome_domain::accessory::Capability;

    #[tokio::test]
    async fn should_discover_three_accessories() {
        let hub = VirtualHub::default();
        let accessories = hub.discover().await.unwrap();
        assert_eq!(accessories.len(), 3);
    }

    #[tokio::test]
    async fn should_classify_with_explicit_roles() {
        let hub = VirtualHub::default();
        let accessories = hub.discover().await.unwrap();

        let classification = VirtualHub::roles().classify(&accessories);

        assert!(classification.has(AccessoryRole::Thermometer));
        assert!(classification.has(AccessoryRole::Hygrometer));
        assert!(classification.has(AccessoryRole::Relay));
    }

    #[tokio::test]
    async fn should_classify_by_legacy_names() {
        let hub = VirtualHub::default();
        let accessories = hub.discover().await.unwrap();

        let classification = RoleMap::new().match_by_name(true).classify(&accessories);

        assert_eq!(classification.len(), 3);
    }

    #[tokio::test]
    async fn should_warm_room_while_relay_on() {
        let hub = VirtualHub::default();
        hub.write(VirtualRelay::handle(), CharacteristicValue::power(true))
            .await
            .unwrap();

        let first = hub.read(VirtualThermometer::handle()).await.unwrap();
        let second = hub.read(VirtualThermometer::handle()).await.unwrap();

        let first = first.as_measurement(&Capability::CurrentTemperature).unwrap();
        let second = second.as_measurement(&Capability::CurrentTemperature).unwrap();
        assert!(second > first);
        assert!(hub.relay_on());
    }

    #[tokio::test]
    async fn should_reject_sensor_writes() {
        let hub = VirtualHub::default();
        let result = hub
            .write(VirtualThermometer::handle(), CharacteristicValue::Float(30.0))
            .await;
        assert!(matches!(result, Err(HomeError::Transport(_))));
    }

    #[tokio::test]
    async fn should_notify_and_refuse_writes_when_relay_offline() {
        let hub = VirtualHub::default();
        let mut changes = hub.subscribe();

        hub.set_relay_reachable(false);

        assert_eq!(
            changes.recv().await.unwrap(),
            AccessoryChange::Reachability {
                accessory: VirtualRelay::ACCESSORY_ID,
                reachable: false,
            }
        );
        let accessories = hub.discover().await.unwrap();
        let relay = accessories
            .iter()
            .find(|a| a.id == VirtualRelay::ACCESSORY_ID)
            .unwrap();
        assert!(!relay.reachable);

        let result = hub
            .write(VirtualRelay::handle(), CharacteristicValue::power(true))
            .await;
        assert!(matches!(result, Err(HomeError::Unreachable(_))));
    }

    #[tokio::test]
    async fn should_report_unknown_handle_as_not_found() {
        let hub = VirtualHub::default();
        let handle = CharacteristicRef {
            accessory: localhome_domain::id::AccessoryId::new(),
            characteristic: VirtualRelay::POWER_ID,
        };
        let result = hub.read(handle).await;
        assert!(matches!(result, Err(HomeError::NotFound(_))));
    }
}
