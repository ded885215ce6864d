//! Offline geocoder backed by a fixed gazetteer.

use localhome_app::ports::GeocodingService;
use localhome_domain::address::HomeAddress;
use localhome_domain::error::{HomeError, NotFoundError};
use localhome_domain::geo::Coordinate;

/// Reverse lookups farther than this from every known place find nothing.
const MAX_REVERSE_DISTANCE_M: f64 = 5_000.0;

/// A known place.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub address: HomeAddress,
    pub coordinate: Coordinate,
}

/// Geocoder answering from an in-memory list of places.
#[derive(Debug, Clone)]
pub struct VirtualGeocoder {
    places: Vec<Place>,
}

impl Default for VirtualGeocoder {
    fn default() -> Self {
        let places = [
            (12, "Main Street", "Springfield", "USA", 11111, 39.7817, -89.6501),
            (8, "Rue de Rivoli", "Paris", "France", 75004, 48.8556, 2.3590),
            (20, "Quai Saint-Antoine", "Lyon", "France", 69002, 45.7620, 4.8297),
        ]
        .into_iter()
        .filter_map(|(number, street, city, country, postal, lat, lon)| {
            Some(Place {
                address: HomeAddress::new(number, street, city, country, postal).ok()?,
                coordinate: Coordinate::new(lat, lon).ok()?,
            })
        })
        .collect();
        Self { places }
    }
}

impl VirtualGeocoder {
    #[must_use]
    pub fn with_places(places: Vec<Place>) -> Self {
        Self { places }
    }

    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    fn nearest(&self, at: Coordinate) -> Option<&Place> {
        self.places
            .iter()
            .map(|place| (place, place.coordinate.distance_to(&at)))
            .filter(|(_, distance)| *distance <= MAX_REVERSE_DISTANCE_M)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(place, _)| place)
    }
}

fn same_place(a: &HomeAddress, b: &HomeAddress) -> bool {
    a.number == b.number
        && a.postal_code == b.postal_code
        && a.street.eq_ignore_ascii_case(&b.street)
        && a.city.eq_ignore_ascii_case(&b.city)
        && a.country.eq_ignore_ascii_case(&b.country)
}

impl GeocodingService for VirtualGeocoder {
    async fn reverse_geocode(&self, at: Coordinate) -> Result<HomeAddress, HomeError> {
        let place = self.nearest(at).ok_or_else(|| NotFoundError {
            entity: "Place",
            id: format!("{:.5},{:.5}", at.latitude, at.longitude),
        })?;
        tracing::debug!(address = %place.address, "virtual reverse geocode");
        Ok(place.address.clone())
    }

    async fn forward_geocode(&self, address: &HomeAddress) -> Result<Coordinate, HomeError> {
        let place = self
            .places
            .iter()
            .find(|place| same_place(&place.address, address))
            .ok_or_else(|| NotFoundError {
                entity: "Place",
                id: address.serialize(),
            })?;
        tracing::debug!(%address, "virtual forward geocode");
        Ok(place.coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_locate_known_address_ignoring_case() {
        let geocoder = VirtualGeocoder::default();
        let address = HomeAddress::parse("12 main street, SPRINGFIELD, usa 11111").unwrap();

        let coordinate = geocoder.forward_geocode(&address).await.unwrap();

        assert!((coordinate.latitude - 39.7817).abs() < 1e-9);
    }

    #[tokio::test]
    async fn should_not_locate_unknown_address() {
        let geocoder = VirtualGeocoder::default();
        let address = HomeAddress::parse("1 Nowhere Lane, Atlantis, Ocean 99999").unwrap();

        let result = geocoder.forward_geocode(&address).await;

        assert!(matches!(result, Err(HomeError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reverse_to_nearest_place() {
        let geocoder = VirtualGeocoder::default();
        let near_rivoli = Coordinate::new(48.8570, 2.3600).unwrap();

        let address = geocoder.reverse_geocode(near_rivoli).await.unwrap();

        assert_eq!(address.city, "Paris");
    }

    #[tokio::test]
    async fn should_find_nothing_far_from_every_place() {
        let geocoder = VirtualGeocoder::default();
        let mid_atlantic = Coordinate::new(30.0, -40.0).unwrap();

        let result = geocoder.reverse_geocode(mid_atlantic).await;

        assert!(matches!(result, Err(HomeError::NotFound(_))));
    }
}
