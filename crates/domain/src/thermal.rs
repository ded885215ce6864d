//! Thermal state held by the control loop.

use serde::{Deserialize, Serialize};

use crate::error::{HomeError, ValidationError};

/// Best-effort latest value of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Reading {
    Value(f64),
    #[default]
    Unavailable,
}

impl Reading {
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unavailable => None,
        }
    }

    #[must_use]
    pub fn is_available(self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Unavailable, Self::Value)
    }
}

/// Temperature, threshold and relay status.
///
/// `relay_on` only changes through a rule decision or a user override.
/// `current_temperature` stays `None` until the first successful read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalState {
    pub current_temperature: Option<f64>,
    pub threshold: f64,
    pub relay_reachable: bool,
    pub relay_on: bool,
}

impl ThermalState {
    /// Fresh state with nothing read yet.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when `threshold` is not finite.
    pub fn new(threshold: f64) -> Result<Self, HomeError> {
        validate_threshold(threshold)?;
        Ok(Self {
            current_temperature: None,
            threshold,
            relay_reachable: false,
            relay_on: false,
        })
    }

    /// Replace the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when `threshold` is not finite.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<(), HomeError> {
        validate_threshold(threshold)?;
        self.threshold = threshold;
        Ok(())
    }

    #[must_use]
    pub fn temperature(&self) -> Reading {
        self.current_temperature.into()
    }
}

/// Reject NaN and infinities.
///
/// # Errors
///
/// Returns [`ValidationError::NonFiniteThreshold`].
pub fn validate_threshold(threshold: f64) -> Result<(), ValidationError> {
    if threshold.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteThreshold(threshold))
    }
}
