//! Nominatim adapter error types.

use localhome_domain::error::{HomeError, NotFoundError, ValidationError};

/// Errors raised while talking to Nominatim.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    /// The server answered but matched nothing.
    #[error("no match for {0}")]
    NoResult(String),

    #[error("server returned coordinate {lat:?},{lon:?}")]
    InvalidCoordinate { lat: String, lon: String },

    /// The reverse result lacks a field a home address needs.
    #[error("reverse result has no usable {0}")]
    IncompleteAddress(&'static str),

    #[error("reverse result is not a valid address")]
    InvalidAddress(#[from] ValidationError),
}

impl From<GeocodeError> for HomeError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NoResult(query) => NotFoundError {
                entity: "Place",
                id: query,
            }
            .into(),
            other => Self::transport(other),
        }
    }
}
