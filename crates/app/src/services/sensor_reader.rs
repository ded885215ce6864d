//! Sensor reader: best-effort latest values from thermometer and hygrometer.
//!
//! [`SensorReader::read`] never waits for the hub: it spawns the read and
//! returns whatever value is cached. The fresh value lands later through
//! [`SensorReader::apply`], and only if its generation is still current.

use std::collections::HashMap;
use std::sync::Arc;

use localhome_domain::accessory::{Capability, CharacteristicRef};
use localhome_domain::generation::Generation;
use localhome_domain::role::{AccessoryRole, Classification};
use localhome_domain::thermal::Reading;

use crate::completion::{Completion, CompletionSender, ReadCompletion};
use crate::ports::AccessoryRegistry;

type Point = (AccessoryRole, Capability);

/// Roles whose characteristics the reader resolves.
const SENSOR_ROLES: [AccessoryRole; 2] = [AccessoryRole::Thermometer, AccessoryRole::Hygrometer];

/// Reads sensor characteristics and caches their last good value.
///
/// Cached values survive reconnects and read errors; handles do not.
pub struct SensorReader<R> {
    registry: Arc<R>,
    completions: CompletionSender,
    generation: Generation,
    handles: HashMap<Point, CharacteristicRef>,
    cache: HashMap<Point, f64>,
}

impl<R: AccessoryRegistry + 'static> SensorReader<R> {
    /// Create a reader with no resolved handles.
    pub fn new(registry: Arc<R>, completions: CompletionSender) -> Self {
        Self {
            registry,
            completions,
            generation: Generation::default(),
            handles: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Drop every handle; completions from older generations become stale.
    pub fn invalidate(&mut self, generation: Generation) {
        self.generation = generation;
        self.handles.clear();
    }

    /// Re-resolve handles from a fresh discovery.
    pub fn resolve(&mut self, generation: Generation, classification: &Classification) {
        self.invalidate(generation);
        for role in SENSOR_ROLES {
            let Some(accessory) = classification.get(role) else {
                tracing::debug!(%role, %generation, "no accessory for sensor role");
                continue;
            };
            for characteristic in &accessory.characteristics {
                self.handles.insert(
                    (role, characteristic.capability.clone()),
                    CharacteristicRef {
                        accessory: accessory.id,
                        characteristic: characteristic.id,
                    },
                );
            }
        }
    }

    /// Issue an asynchronous read and return the cached value.
    ///
    /// The returned value is the latest known one, not the one being fetched.
    pub fn read(&self, role: AccessoryRole, capability: &Capability) -> Reading {
        let key = (role, capability.clone());
        match self.handles.get(&key) {
            Some(handle) => self.spawn_read(*handle, key),
            None => {
                tracing::debug!(%role, %capability, "no characteristic to read");
            }
        }
        self.latest(role, capability)
    }

    /// Most recent good value for a point.
    #[must_use]
    pub fn latest(&self, role: AccessoryRole, capability: &Capability) -> Reading {
        self.cache.get(&(role, capability.clone())).copied().into()
    }

    /// Apply a read completion. Returns the new value when it was accepted.
    pub fn apply(&mut self, completion: ReadCompletion) -> Option<f64> {
        let ReadCompletion {
            generation,
            role,
            capability,
            result,
        } = completion;

        if !generation.is_current(self.generation) {
            tracing::debug!(
                %role,
                %generation,
                current = %self.generation,
                "dropping read from superseded generation"
            );
            return None;
        }

        let value = match result {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%role, %capability, %err, "sensor read failed, keeping last value");
                return None;
            }
        };

        match value.as_measurement(&capability) {
            Ok(measurement) => {
                self.cache.insert((role, capability), measurement);
                Some(measurement)
            }
            Err(err) => {
                tracing::warn!(%role, %err, "sensor returned an undecodable value");
                None
            }
        }
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn spawn_read(&self, handle: CharacteristicRef, (role, capability): Point) {
        let registry = Arc::clone(&self.registry);
        let completions = self.completions.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = registry.read(handle).await;
            let _ = completions.send(Completion::Read(ReadCompletion {
                generation,
                role,
                capability,
                result,
            }));
        });
    }
}
