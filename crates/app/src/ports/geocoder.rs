//! Geocoding port: turn addresses into coordinates and back.

use std::future::Future;

use localhome_domain::address::HomeAddress;
use localhome_domain::error::HomeError;
use localhome_domain::geo::Coordinate;

/// Forward and reverse geocoding.
///
/// Calls are rate limited by the control loop; implementations do not need
/// their own throttling.
pub trait GeocodingService: Send + Sync {
    /// Find the postal address closest to `at`.
    fn reverse_geocode(
        &self,
        at: Coordinate,
    ) -> impl Future<Output = Result<HomeAddress, HomeError>> + Send;

    /// Find the coordinate of `address`.
    fn forward_geocode(
        &self,
        address: &HomeAddress,
    ) -> impl Future<Output = Result<Coordinate, HomeError>> + Send;
}
