//! HTTP client for the Nominatim `/search` and `/reverse` endpoints.

use localhome_app::ports::GeocodingService;
use localhome_domain::address::HomeAddress;
use localhome_domain::error::HomeError;
use localhome_domain::geo::Coordinate;

use crate::config::NominatimConfig;
use crate::error::GeocodeError;
use crate::response::{self, ReverseResponse, SearchHit};

/// Geocoder backed by a Nominatim server.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: reqwest::Client,
    config: NominatimConfig,
}

impl NominatimGeocoder {
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http, config })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = self.config.endpoint(path);
        tracing::debug!(url = %url, "nominatim request");
        let request = self.http.get(url).query(&[("format", "jsonv2")]);
        match &self.config.language {
            Some(language) => request.query(&[("accept-language", language.as_str())]),
            None => request,
        }
    }

    async fn search(&self, address: &HomeAddress) -> Result<Coordinate, GeocodeError> {
        let street = format!("{} {}", address.number, address.street);
        let postal_code = address.postal_code.to_string();
        let hits: Vec<SearchHit> = self
            .request("search")
            .query(&[
                ("street", street.as_str()),
                ("city", address.city.as_str()),
                ("country", address.country.as_str()),
                ("postalcode", postal_code.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response::coordinate_from_hits(&address.serialize(), hits)
    }

    async fn reverse(&self, at: Coordinate) -> Result<HomeAddress, GeocodeError> {
        let body: ReverseResponse = self
            .request("reverse")
            .query(&[("lat", at.latitude), ("lon", at.longitude)])
            .query(&[("addressdetails", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response::address_from_reverse(at, body)
    }
}

impl GeocodingService for NominatimGeocoder {
    async fn reverse_geocode(&self, at: Coordinate) -> Result<HomeAddress, HomeError> {
        let address = self.reverse(at).await?;
        tracing::debug!(%address, "nominatim reverse geocode");
        Ok(address)
    }

    async fn forward_geocode(&self, address: &HomeAddress) -> Result<Coordinate, HomeError> {
        let coordinate = self.search(address).await?;
        tracing::debug!(
            %address,
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            "nominatim forward geocode"
        );
        Ok(coordinate)
    }
}
