//! In-memory port implementations shared by the app crate's tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;

use localhome_domain::accessory::{
    Accessory, AccessoryChange, Capability, Characteristic, CharacteristicRef, CharacteristicValue,
};
use localhome_domain::address::HomeAddress;
use localhome_domain::error::{HomeError, NotFoundError};
use localhome_domain::geo::Coordinate;

use crate::ports::{AccessoryRegistry, GeocodingService, SettingsStore, StoredSettings};

// ── Accessories ───────────────────────────────────────────────────

pub fn thermometer() -> Accessory {
    Accessory::builder()
        .name("Living room temp")
        .characteristic(Characteristic::new(Capability::CurrentTemperature))
        .build()
        .unwrap()
}

pub fn hygrometer() -> Accessory {
    Accessory::builder()
        .name("Living room hum")
        .characteristic(Characteristic::new(Capability::CurrentRelativeHumidity))
        .build()
        .unwrap()
}

pub fn relay(reachable: bool) -> Accessory {
    Accessory::builder()
        .name("Heater relais")
        .reachable(reachable)
        .characteristic(Characteristic::new(Capability::PowerState))
        .build()
        .unwrap()
}

pub fn handle(accessory: &Accessory, capability: &Capability) -> CharacteristicRef {
    accessory.handle(capability).unwrap()
}

// ── Registry ──────────────────────────────────────────────────────

#[derive(Default)]
struct RegistryState {
    accessories: Vec<Accessory>,
    values: HashMap<CharacteristicRef, CharacteristicValue>,
    scripted_reads: HashMap<CharacteristicRef, VecDeque<(Duration, CharacteristicValue)>>,
    failing_reads: bool,
    failing_writes: bool,
    failing_discoveries: usize,
    writes: Vec<(CharacteristicRef, CharacteristicValue)>,
    discoveries: usize,
}

pub struct FakeRegistry {
    state: Mutex<RegistryState>,
    changes: broadcast::Sender<AccessoryChange>,
}

impl FakeRegistry {
    pub fn with(accessories: Vec<Accessory>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(RegistryState {
                accessories,
                ..RegistryState::default()
            }),
            changes,
        }
    }

    pub fn set_value(&self, handle: CharacteristicRef, value: CharacteristicValue) {
        self.state.lock().unwrap().values.insert(handle, value);
    }

    /// Queue a read answer delivered after `delay`, ahead of the plain value.
    pub fn script_read(&self, handle: CharacteristicRef, delay: Duration, value: CharacteristicValue) {
        self.state
            .lock()
            .unwrap()
            .scripted_reads
            .entry(handle)
            .or_default()
            .push_back((delay, value));
    }

    pub fn fail_reads(&self, failing: bool) {
        self.state.lock().unwrap().failing_reads = failing;
    }

    pub fn fail_writes(&self, failing: bool) {
        self.state.lock().unwrap().failing_writes = failing;
    }

    pub fn fail_next_discoveries(&self, count: usize) {
        self.state.lock().unwrap().failing_discoveries = count;
    }

    pub fn replace_accessories(&self, accessories: Vec<Accessory>) {
        self.state.lock().unwrap().accessories = accessories;
    }

    pub fn notify(&self, change: AccessoryChange) {
        let _ = self.changes.send(change);
    }

    pub fn writes(&self) -> Vec<(CharacteristicRef, CharacteristicValue)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn discoveries(&self) -> usize {
        self.state.lock().unwrap().discoveries
    }
}

fn offline() -> HomeError {
    HomeError::transport(std::io::Error::other("hub offline"))
}

impl AccessoryRegistry for FakeRegistry {
    async fn discover(&self) -> Result<Vec<Accessory>, HomeError> {
        let mut state = self.state.lock().unwrap();
        state.discoveries += 1;
        if state.failing_discoveries > 0 {
            state.failing_discoveries -= 1;
            return Err(offline());
        }
        Ok(state.accessories.clone())
    }

    async fn read(&self, handle: CharacteristicRef) -> Result<CharacteristicValue, HomeError> {
        let (delay, value) = {
            let mut state = self.state.lock().unwrap();
            if state.failing_reads {
                return Err(offline());
            }
            let scripted = state
                .scripted_reads
                .get_mut(&handle)
                .and_then(VecDeque::pop_front);
            match scripted {
                Some(answer) => answer,
                None => {
                    let value = state.values.get(&handle).cloned().ok_or_else(|| {
                        HomeError::from(NotFoundError {
                            entity: "Characteristic",
                            id: handle.to_string(),
                        })
                    })?;
                    (Duration::ZERO, value)
                }
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(value)
    }

    async fn write(
        &self,
        handle: CharacteristicRef,
        value: CharacteristicValue,
    ) -> Result<(), HomeError> {
        let mut state = self.state.lock().unwrap();
        state.writes.push((handle, value.clone()));
        if state.failing_writes {
            return Err(offline());
        }
        state.values.insert(handle, value);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AccessoryChange> {
        self.changes.subscribe()
    }
}

// ── Geocoder ──────────────────────────────────────────────────────

pub struct FakeGeocoder {
    pub place: HomeAddress,
    pub location: Coordinate,
    pub delay: Duration,
    failing: Mutex<bool>,
    forward_calls: AtomicUsize,
    reverse_calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new(place: HomeAddress, location: Coordinate) -> Self {
        Self {
            place,
            location,
            delay: Duration::ZERO,
            failing: Mutex::new(false),
            forward_calls: AtomicUsize::new(0),
            reverse_calls: AtomicUsize::new(0),
        }
    }

    pub fn springfield() -> Self {
        Self::new(
            HomeAddress::new(12, "Main Street", "Springfield", "USA", 11111).unwrap(),
            Coordinate::new(39.7817, -89.6501).unwrap(),
        )
    }

    pub fn fail(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn forward_calls(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }

    async fn answer<T>(&self, value: T) -> Result<T, HomeError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if *self.failing.lock().unwrap() {
            return Err(HomeError::transport(std::io::Error::other("no result")));
        }
        Ok(value)
    }
}

impl GeocodingService for FakeGeocoder {
    async fn reverse_geocode(&self, _at: Coordinate) -> Result<HomeAddress, HomeError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(self.place.clone()).await
    }

    async fn forward_geocode(&self, _address: &HomeAddress) -> Result<Coordinate, HomeError> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(self.location).await
    }
}

// ── Settings ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemorySettings {
    stored: Mutex<StoredSettings>,
}

impl MemorySettings {
    pub fn with(stored: StoredSettings) -> Self {
        Self {
            stored: Mutex::new(stored),
        }
    }

    pub fn stored(&self) -> StoredSettings {
        self.stored.lock().unwrap().clone()
    }
}

impl SettingsStore for MemorySettings {
    async fn load(&self) -> Result<StoredSettings, HomeError> {
        Ok(self.stored())
    }

    async fn save_home_address(&self, address: &HomeAddress) -> Result<(), HomeError> {
        self.stored.lock().unwrap().home_address = Some(address.serialize());
        Ok(())
    }

    async fn save_threshold(&self, threshold: f64) -> Result<(), HomeError> {
        self.stored.lock().unwrap().threshold = Some(threshold);
        Ok(())
    }
}
