//! Typed characteristic values and their fallible decoding.

use serde::{Deserialize, Serialize};

use crate::accessory::Capability;
use crate::error::DecodeError;

/// A raw value as reported by the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CharacteristicValue {
    /// Name of the variant, used in decode errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Decode a numeric measurement for a temperature or humidity capability.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the value is not numeric or not finite.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_measurement(&self, capability: &Capability) -> Result<f64, DecodeError> {
        let value = match self {
            Self::Float(v) => *v,
            Self::Int(v) => *v as f64,
            other => return Err(mismatch(capability, other.kind())),
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(mismatch(capability, "non-finite float"))
        }
    }

    /// Decode a power state. `1`/`true` is ON and `0`/`false` is OFF.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for strings, floats and integers other than 0/1.
    pub fn as_power(&self) -> Result<bool, DecodeError> {
        match self {
            Self::Bool(on) => Ok(*on),
            Self::Int(1) => Ok(true),
            Self::Int(0) => Ok(false),
            other => Err(mismatch(&Capability::PowerState, other.kind())),
        }
    }

    /// Value to write for a power state command.
    #[must_use]
    pub fn power(on: bool) -> Self {
        Self::Bool(on)
    }
}

fn mismatch(capability: &Capability, found: &'static str) -> DecodeError {
    DecodeError {
        expected: capability.clone(),
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_decode_float_temperature() {
        let value = CharacteristicValue::Float(18.5);
        assert_eq!(
            value.as_measurement(&Capability::CurrentTemperature),
            Ok(18.5)
        );
    }

    #[test]
    fn should_decode_integer_humidity() {
        let value = CharacteristicValue::Int(45);
        assert_eq!(
            value.as_measurement(&Capability::CurrentRelativeHumidity),
            Ok(45.0)
        );
    }

    #[test]
    fn should_reject_string_measurement() {
        let value = CharacteristicValue::String("warm".into());
        let err = value
            .as_measurement(&Capability::CurrentTemperature)
            .unwrap_err();
        assert_eq!(err.found, "string");
        assert_eq!(err.expected, Capability::CurrentTemperature);
    }

    #[test]
    fn should_reject_nan_measurement() {
        let value = CharacteristicValue::Float(f64::NAN);
        assert!(value.as_measurement(&Capability::CurrentTemperature).is_err());
    }

    #[test]
    fn should_decode_power_without_inversion() {
        assert_eq!(CharacteristicValue::Int(1).as_power(), Ok(true));
        assert_eq!(CharacteristicValue::Int(0).as_power(), Ok(false));
        assert_eq!(CharacteristicValue::Bool(true).as_power(), Ok(true));
    }

    #[test]
    fn should_reject_out_of_range_power_integer() {
        assert!(CharacteristicValue::Int(2).as_power().is_err());
    }

    #[test]
    fn should_deserialize_untagged_values() {
        let v: CharacteristicValue = serde_json::from_str("21.5").unwrap();
        assert_eq!(v, CharacteristicValue::Float(21.5));
        let v: CharacteristicValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, CharacteristicValue::Bool(true));
        let v: CharacteristicValue = serde_json::from_str("1").unwrap();
        assert_eq!(v, CharacteristicValue::Int(1));
    }
}
