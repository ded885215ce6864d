//! Home address: a structured postal address and its persisted string form.
//!
//! The persisted form is `"<number> <street>, <city>, <country> <postalCode>"`,
//! e.g. `"12 Main Street, Springfield, USA 11111"`. Parsing that string gives
//! back the same fields for any address whose text fields are non-empty and
//! comma-free.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A structured postal address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HomeAddress {
    pub number: u32,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: u32,
}

impl HomeAddress {
    /// Build an address, trimming text fields.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a text field is empty or contains a
    /// comma (the separator of the persisted form).
    pub fn new(
        number: u32,
        street: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
        postal_code: u32,
    ) -> Result<Self, ValidationError> {
        let address = Self {
            number,
            street: street.into().trim().to_string(),
            city: city.into().trim().to_string(),
            country: country.into().trim().to_string(),
            postal_code,
        };
        address.validate()?;
        Ok(address)
    }

    /// Check that every text field survives a round trip.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for empty, comma-bearing or untrimmed
    /// fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("street", &self.street),
            ("city", &self.city),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField(name));
            }
            if value.contains(',') {
                return Err(ValidationError::CommaInField(name));
            }
            // parsing trims every segment
            if value.trim() != value.as_str() {
                return Err(ValidationError::UntrimmedField(name));
            }
        }
        Ok(())
    }

    /// Persisted single-string form.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Inverse of [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns [`AddressParseError`] describing the first malformed segment.
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        raw.parse()
    }
}

impl fmt::Display for HomeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {}, {} {}",
            self.number, self.street, self.city, self.country, self.postal_code
        )
    }
}

/// Why a persisted address string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("expected 3 comma-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("missing street after house number")]
    MissingStreet,

    #[error("invalid house number {0:?}")]
    InvalidNumber(String),

    #[error("missing city")]
    MissingCity,

    #[error("missing country before postal code")]
    MissingCountry,

    #[error("invalid postal code {0:?}")]
    InvalidPostalCode(String),
}

impl FromStr for HomeAddress {
    type Err = AddressParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [first, city, last] = segments.as_slice() else {
            return Err(AddressParseError::SegmentCount(segments.len()));
        };

        let (number, street) = first
            .split_once(char::is_whitespace)
            .ok_or(AddressParseError::MissingStreet)?;
        let number = number
            .parse()
            .map_err(|_| AddressParseError::InvalidNumber(number.to_string()))?;
        let street = street.trim();
        if street.is_empty() {
            return Err(AddressParseError::MissingStreet);
        }

        if city.is_empty() {
            return Err(AddressParseError::MissingCity);
        }

        let (country, postal_code) = last
            .rsplit_once(char::is_whitespace)
            .ok_or(AddressParseError::MissingCountry)?;
        let postal_code = postal_code
            .parse()
            .map_err(|_| AddressParseError::InvalidPostalCode(postal_code.to_string()))?;
        let country = country.trim();
        if country.is_empty() {
            return Err(AddressParseError::MissingCountry);
        }

        Ok(Self {
            number,
            street: street.to_string(),
            city: (*city).to_string(),
            country: country.to_string(),
            postal_code,
        })
    }
}
