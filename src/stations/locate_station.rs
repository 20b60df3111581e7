use crate::error::UsageError;
use crate::stations::catalog::Catalog;
use crate::types::station::Station;
use ordered_float::OrderedFloat;

fn check_coordinate(latitude: f64, longitude: f64) -> Result<(), UsageError> {
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    if valid {
        Ok(())
    } else {
        Err(UsageError::StationNotFound {
            lat: latitude,
            lon: longitude,
        })
    }
}

/// Finds the station closest to `(latitude, longitude)`.
///
/// Distance is the squared Euclidean distance in raw degrees (see [`Station::distance_2`]).
/// On ties the station listed first in the catalog wins. Stations whose coordinates could
/// not be parsed are skipped.
///
/// # Errors
///
/// [`UsageError::StationNotFound`] for non-finite or out-of-range input, or if no station
/// has a usable position.
pub fn nearest(catalog: &Catalog, latitude: f64, longitude: f64) -> Result<&Station, UsageError> {
    check_coordinate(latitude, longitude)?;
    catalog
        .stations()
        .iter()
        .filter_map(|station| {
            station
                .distance_2(latitude, longitude)
                .map(|d| (station, OrderedFloat(d)))
        })
        // `min_by_key` keeps the first of several equal minima.
        .min_by_key(|(_, d)| *d)
        .map(|(station, _)| station)
        .ok_or(UsageError::StationNotFound {
            lat: latitude,
            lon: longitude,
        })
}

/// Up to `limit` stations ordered by distance (closest first), with their squared distance.
pub fn nearby(
    catalog: &Catalog,
    latitude: f64,
    longitude: f64,
    limit: usize,
) -> Result<Vec<(&Station, f64)>, UsageError> {
    check_coordinate(latitude, longitude)?;
    let mut ranked: Vec<(&Station, f64)> = catalog
        .stations()
        .iter()
        .filter_map(|station| {
            station
                .distance_2(latitude, longitude)
                .map(|d| (station, d))
        })
        .collect();
    // Stable sort keeps catalog order among equal distances.
    ranked.sort_by_key(|(_, d)| OrderedFloat(*d));
    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_catalog;
    use crate::types::station::Coordinate;

    fn station(id: &str, lat: f64, lon: f64) -> Station {
        Station {
            id: id.to_string(),
            latitude: Coordinate::Decimal(lat),
            longitude: Coordinate::Decimal(lon),
            name: id.to_string(),
            state: None,
            altitude: None,
        }
    }

    #[test]
    fn picks_graz_over_vienna() {
        let catalog = Catalog::new(
            vec![station("A", 46.98, 15.44), station("B", 48.2, 16.3)],
            Vec::new(),
        );
        assert_eq!(nearest(&catalog, 46.99, 15.50).unwrap().id, "A");
    }

    #[test]
    fn fixture_catalog_nearest_to_graz() {
        let catalog = sample_catalog();
        assert_eq!(nearest(&catalog, 46.9, 15.4).unwrap().id, "11240");
        assert_eq!(nearest(&catalog, 48.2, 16.4).unwrap().id, "11035");
    }

    #[test]
    fn result_is_never_farther_than_any_other_station() {
        let catalog = sample_catalog();
        for (lat, lon) in [(47.0, 10.0), (48.5, 17.0), (46.5, 13.5), (47.5, 14.0)] {
            let best = nearest(&catalog, lat, lon).unwrap();
            let best_d = best.distance_2(lat, lon).unwrap();
            for other in catalog.stations() {
                assert!(best_d <= other.distance_2(lat, lon).unwrap());
            }
        }
    }

    #[test]
    fn ties_go_to_first_listed_station() {
        let catalog = Catalog::new(
            vec![station("first", 47.0, 15.0), station("second", 47.0, 17.0)],
            Vec::new(),
        );
        assert_eq!(nearest(&catalog, 47.0, 16.0).unwrap().id, "first");
    }

    #[test]
    fn empty_catalog_is_station_not_found() {
        let catalog = Catalog::new(Vec::new(), Vec::new());
        let err = nearest(&catalog, 47.0, 15.0).unwrap_err();
        assert!(matches!(err, UsageError::StationNotFound { .. }));
    }

    #[test]
    fn stations_without_position_are_skipped() {
        let mut broken = station("broken", 0.0, 0.0);
        broken.latitude = Coordinate::Unparsed("?".to_string());
        let catalog = Catalog::new(vec![broken.clone()], Vec::new());
        assert!(nearest(&catalog, 0.0, 0.0).is_err());

        let catalog = Catalog::new(vec![broken, station("ok", 50.0, 10.0)], Vec::new());
        assert_eq!(nearest(&catalog, 0.0, 0.0).unwrap().id, "ok");
    }

    #[test]
    fn invalid_coordinates_are_station_not_found() {
        let catalog = sample_catalog();
        for (lat, lon) in [(f64::NAN, 15.0), (47.0, f64::INFINITY), (91.0, 15.0), (47.0, -181.0)] {
            let err = nearest(&catalog, lat, lon).unwrap_err();
            assert!(matches!(err, UsageError::StationNotFound { .. }));
            let err = nearby(&catalog, lat, lon, 3).unwrap_err();
            assert!(matches!(err, UsageError::StationNotFound { .. }));
        }
    }

    #[test]
    fn nearby_is_sorted_and_limited() {
        let catalog = sample_catalog();
        let ranked = nearby(&catalog, 47.0, 15.4, 3).unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0.id, "11240");
        assert!(ranked.windows(2).all(|w| w[0].1 <= w[1].1));
        assert!(nearby(&catalog, 47.0, 15.4, 0).unwrap().is_empty());
    }
}
