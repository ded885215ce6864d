//! Nominatim `jsonv2` payloads and their conversion into domain types.

use serde::Deserialize;

use localhome_domain::address::HomeAddress;
use localhome_domain::geo::Coordinate;

use crate::error::GeocodeError;

/// One `/search` result. Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// `/reverse` body: either an `address` object or an `error` message.
#[derive(Debug, Deserialize)]
pub(crate) struct ReverseResponse {
    #[serde(default)]
    address: Option<AddressDetails>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressDetails {
    house_number: Option<String>,
    road: Option<String>,
    pedestrian: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    country: Option<String>,
    postcode: Option<String>,
}

/// Coordinate of the best search hit for `query`.
pub(crate) fn coordinate_from_hits(
    query: &str,
    hits: Vec<SearchHit>,
) -> Result<Coordinate, GeocodeError> {
    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NoResult(query.to_string()))?;
    let invalid = || GeocodeError::InvalidCoordinate {
        lat: hit.lat.clone(),
        lon: hit.lon.clone(),
    };
    let latitude: f64 = hit.lat.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = hit.lon.trim().parse().map_err(|_| invalid())?;
    if let Some(name) = &hit.display_name {
        tracing::trace!(name = %name, "nominatim search hit");
    }
    Coordinate::new(latitude, longitude).map_err(|_| invalid())
}

/// Home address described by a reverse lookup at `at`.
pub(crate) fn address_from_reverse(
    at: Coordinate,
    response: ReverseResponse,
) -> Result<HomeAddress, GeocodeError> {
    let Some(details) = response.address else {
        let reason = response.error.unwrap_or_else(|| "empty response".to_string());
        return Err(GeocodeError::NoResult(format!(
            "{:.5},{:.5} ({reason})",
            at.latitude, at.longitude
        )));
    };

    let number = details
        .house_number
        .as_deref()
        .and_then(leading_number)
        .ok_or(GeocodeError::IncompleteAddress("house_number"))?;
    let street = details
        .road
        .or(details.pedestrian)
        .ok_or(GeocodeError::IncompleteAddress("road"))?;
    let city = details
        .city
        .or(details.town)
        .or(details.village)
        .or(details.municipality)
        .ok_or(GeocodeError::IncompleteAddress("city"))?;
    let country = details
        .country
        .ok_or(GeocodeError::IncompleteAddress("country"))?;
    let postal_code = details
        .postcode
        .as_deref()
        .and_then(leading_number)
        .ok_or(GeocodeError::IncompleteAddress("postcode"))?;

    Ok(HomeAddress::new(
        number,
        strip_commas(&street),
        strip_commas(&city),
        strip_commas(&country),
        postal_code,
    )?)
}

/// `12`, `12a` and `12-14` all give 12.
fn leading_number(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    raw[..end].parse().ok()
}

// Commas separate the persisted address segments.
fn strip_commas(value: &str) -> String {
    value.replace(',', " ")
}
