//! Runtime choice between the offline and the Nominatim geocoder.

use localhome_adapter_nominatim::{GeocodeError, NominatimGeocoder};
use localhome_adapter_virtual::VirtualGeocoder;
use localhome_app::ports::GeocodingService;
use localhome_domain::address::HomeAddress;
use localhome_domain::error::HomeError;
use localhome_domain::geo::Coordinate;

use crate::config::{GeocodingConfig, GeocodingProvider};

/// The geocoder selected by `[geocoding] provider`.
pub enum Geocoder {
    Virtual(VirtualGeocoder),
    Nominatim(NominatimGeocoder),
}

impl Geocoder {
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the Nominatim HTTP client cannot be built.
    pub fn from_config(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        Ok(match config.provider {
            GeocodingProvider::Virtual => Self::Virtual(VirtualGeocoder::default()),
            GeocodingProvider::Nominatim => {
                Self::Nominatim(NominatimGeocoder::new(config.nominatim.clone())?)
            }
        })
    }

    #[must_use]
    pub fn provider(&self) -> GeocodingProvider {
        match self {
            Self::Virtual(_) => GeocodingProvider::Virtual,
            Self::Nominatim(_) => GeocodingProvider::Nominatim,
        }
    }
}

impl GeocodingService for Geocoder {
    async fn reverse_geocode(&self, at: Coordinate) -> Result<HomeAddress, HomeError> {
        match self {
            Self::Virtual(geocoder) => geocoder.reverse_geocode(at).await,
            Self::Nominatim(geocoder) => geocoder.reverse_geocode(at).await,
        }
    }

    async fn forward_geocode(&self, address: &HomeAddress) -> Result<Coordinate, HomeError> {
        match self {
            Self::Virtual(geocoder) => geocoder.forward_geocode(address).await,
            Self::Nominatim(geocoder) => geocoder.forward_geocode(address).await,
        }
    }
}
