//! Accessory: a discoverable hub device exposing typed characteristics.
//!
//! The hub owns accessories; the domain only holds snapshots of what a
//! discovery returned. Characteristic handles ([`CharacteristicRef`]) are
//! only meaningful for the discovery generation that produced them.

mod value;

pub use value::CharacteristicValue;

use serde::{Deserialize, Serialize};

use crate::error::{HomeError, ValidationError};
use crate::id::{AccessoryId, CharacteristicId};

/// Capability tag of a characteristic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CurrentTemperature,
    CurrentRelativeHumidity,
    PowerState,
    /// Any characteristic type the controller does not use.
    Other(String),
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CurrentTemperature => f.write_str("current_temperature"),
            Self::CurrentRelativeHumidity => f.write_str("current_relative_humidity"),
            Self::PowerState => f.write_str("power_state"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// A single readable/writable typed data point on an accessory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    pub id: CharacteristicId,
    pub capability: Capability,
    /// Value the hub had cached at discovery time, if any.
    pub value: Option<CharacteristicValue>,
}

impl Characteristic {
    #[must_use]
    pub fn new(capability: Capability) -> Self {
        Self {
            id: CharacteristicId::new(),
            capability,
            value: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: CharacteristicId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: CharacteristicValue) -> Self {
        self.value = Some(value);
        self
    }
}

/// Address of one characteristic on one accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacteristicRef {
    pub accessory: AccessoryId,
    pub characteristic: CharacteristicId,
}

impl std::fmt::Display for CharacteristicRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.accessory, self.characteristic)
    }
}

/// A device discovered on the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    pub id: AccessoryId,
    pub name: String,
    /// Hub-reported liveness, independent of value freshness.
    pub reachable: bool,
    pub characteristics: Vec<Characteristic>,
}

impl Accessory {
    /// Create a builder for constructing an [`Accessory`].
    #[must_use]
    pub fn builder() -> AccessoryBuilder {
        AccessoryBuilder::default()
    }

    /// Find the first characteristic carrying `capability`.
    #[must_use]
    pub fn characteristic(&self, capability: &Capability) -> Option<&Characteristic> {
        self.characteristics
            .iter()
            .find(|c| &c.capability == capability)
    }

    /// Handle to the first characteristic carrying `capability`.
    #[must_use]
    pub fn handle(&self, capability: &Capability) -> Option<CharacteristicRef> {
        self.characteristic(capability).map(|c| CharacteristicRef {
            accessory: self.id,
            characteristic: c.id,
        })
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), HomeError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("accessory name").into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Accessory`].
#[derive(Debug, Default)]
pub struct AccessoryBuilder {
    id: Option<AccessoryId>,
    name: Option<String>,
    reachable: Option<bool>,
    characteristics: Vec<Characteristic>,
}

impl AccessoryBuilder {
    #[must_use]
    pub fn id(mut self, id: AccessoryId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn reachable(mut self, reachable: bool) -> Self {
        self.reachable = Some(reachable);
        self
    }

    #[must_use]
    pub fn characteristic(mut self, characteristic: Characteristic) -> Self {
        self.characteristics.push(characteristic);
        self
    }

    /// Consume the builder and produce a validated [`Accessory`].
    ///
    /// Accessories are reachable unless stated otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when the name is missing or empty.
    pub fn build(self) -> Result<Accessory, HomeError> {
        let accessory = Accessory {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            reachable: self.reachable.unwrap_or(true),
            characteristics: self.characteristics,
        };
        accessory.validate()?;
        Ok(accessory)
    }
}

/// Accessory-level change notification emitted by the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessoryChange {
    Reachability { accessory: AccessoryId, reachable: bool },
    Added { accessory: AccessoryId },
    Removed { accessory: AccessoryId },
    Updated { accessory: AccessoryId },
}

impl AccessoryChange {
    #[must_use]
    pub fn accessory(&self) -> AccessoryId {
        match self {
            Self::Reachability { accessory, .. }
            | Self::Added { accessory }
            | Self::Removed { accessory }
            | Self::Updated { accessory } => *accessory,
        }
    }
}
