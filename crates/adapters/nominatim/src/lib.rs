//! # localhome-adapter-nominatim
//!
//! [`GeocodingService`](localhome_app::ports::GeocodingService) backed by an
//! OpenStreetMap [Nominatim](https://nominatim.org) server.
//!
//! Forward lookups use the structured `/search` query, reverse lookups use
//! `/reverse` with address details. The public server asks for an
//! identifying user agent and at most one request per second; the control
//! loop's geocode limiter is far stricter than that.
//!
//! ## Dependency rule
//!
//! Depends on `localhome-app` (port traits) and `localhome-domain` only.

mod client;
mod config;
mod error;
mod response;

pub use client::NominatimGeocoder;
pub use config::NominatimConfig;
pub use error::GeocodeError;
