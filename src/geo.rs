// Static geocoding: the dataset only ever names five cities, so the map
// uses a fixed coordinate table instead of a geocoding service. Cities
// outside the table simply get no coordinates and never reach the map.
use crate::types::Listing;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static CITY_COORDINATES: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("Belo Horizonte", (-19.9191, -43.9386)),
        ("Rio de Janeiro", (-22.9068, -43.1729)),
        ("São Paulo", (-23.5505, -46.6333)),
        ("Porto Alegre", (-30.0346, -51.2177)),
        ("Campinas", (-22.9056, -47.0608)),
    ])
});

pub fn coordinates_for(city: &str) -> Option<(f64, f64)> {
    CITY_COORDINATES.get(city).copied()
}

/// Join the coordinate table onto the listings by city name. No match means
/// both fields stay `None`; that is an expected outcome, not an error.
pub fn attach_coordinates(listings: &mut [Listing]) {
    for l in listings.iter_mut() {
        if let Some((lat, lon)) = coordinates_for(&l.city) {
            l.lat = Some(lat);
            l.lon = Some(lon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{test_listing, PetPolicy};

    #[test]
    fn known_city_gets_exact_coordinates() {
        assert_eq!(coordinates_for("São Paulo"), Some((-23.5505, -46.6333)));
        assert_eq!(coordinates_for("Porto Alegre"), Some((-30.0346, -51.2177)));
    }

    #[test]
    fn unknown_city_yields_absent_coordinates() {
        assert_eq!(coordinates_for("Curitiba"), None);
    }

    #[test]
    fn join_leaves_unknown_cities_without_coordinates() {
        let mut rows = vec![
            test_listing("São Paulo", 70.0, 2000.0, PetPolicy::Accepts),
            test_listing("Curitiba", 55.0, 1200.0, PetPolicy::Rejects),
        ];
        attach_coordinates(&mut rows);
        assert_eq!(rows[0].lat, Some(-23.5505));
        assert_eq!(rows[0].lon, Some(-46.6333));
        assert_eq!(rows[1].lat, None);
        assert_eq!(rows[1].lon, None);
    }
}
