//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HomeError`]
//! via `#[from]` (or an explicit `From` impl for adapter errors).

use crate::accessory::Capability;
use crate::address::AddressParseError;
use crate::id::AccessoryId;

/// Top-level error shared by ports and services.
#[derive(Debug, thiserror::Error)]
pub enum HomeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("characteristic decode error")]
    Decode(#[from] DecodeError),

    #[error("malformed address")]
    Address(#[from] AddressParseError),

    #[error("accessory {0} is not reachable")]
    Unreachable(AccessoryId),

    /// Read, write, discovery, geocoding or storage failure in an adapter.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("control loop is not running")]
    LoopStopped,
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("{0} must not contain a comma")]
    CommaInField(&'static str),

    #[error("{0} must not start or end with whitespace")]
    UntrimmedField(&'static str),

    #[error("threshold must be a finite number, got {0}")]
    NonFiniteThreshold(f64),

    #[error("latitude {0} is out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is out of range [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A characteristic value did not have the type its capability requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot decode {found} value as {expected}")]
pub struct DecodeError {
    pub expected: Capability,
    pub found: &'static str,
}

impl HomeError {
    /// Wrap any adapter error as a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}
