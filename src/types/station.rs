//! Defines the data structures representing TAWES weather stations as listed in the
//! dataset metadata, including the tolerant coordinate representation.

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Data Structures ---

/// A coordinate component (latitude or longitude) as published by the service.
///
/// Values normally arrive as JSON numbers. Some station lists use a comma as decimal
/// separator ("46,98"); those are normalized to [`Coordinate::Decimal`]. A value that
/// cannot be read as a number is kept verbatim in [`Coordinate::Unparsed`] instead of
/// failing the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Coordinate {
    Decimal(f64),
    Unparsed(String),
}

impl Coordinate {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Coordinate::Decimal(value) => Some(*value),
            Coordinate::Unparsed(_) => None,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Decimal(value) => write!(f, "{value}"),
            Coordinate::Unparsed(raw) => f.write_str(raw),
        }
    }
}

/// A single TAWES weather station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Station identifier (e.g., "11240" for Graz-Thalerhof).
    pub id: String,
    /// Latitude in decimal degrees.
    pub latitude: Coordinate,
    /// Longitude in decimal degrees.
    pub longitude: Coordinate,
    /// Display name (e.g., "GRAZ-THALERHOF-FLUGHAFEN").
    pub name: String,
    /// Federal state, if listed.
    pub state: Option<String>,
    /// Elevation above sea level in meters, if listed.
    pub altitude: Option<f64>,
}

impl Station {
    /// `(latitude, longitude)` if both components are numeric.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude.as_f64()?, self.longitude.as_f64()?))
    }

    /// Squared Euclidean distance in the (latitude, longitude) plane.
    ///
    /// Treats degrees as Cartesian coordinates. Good enough to rank the stations of one
    /// country against each other, not a real geographic distance.
    pub fn distance_2(&self, latitude: f64, longitude: f64) -> Option<f64> {
        let (lat, lon) = self.position()?;
        let dx = lat - latitude;
        let dy = lon - longitude;
        Some(dx * dx + dy * dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(lat: Coordinate, lon: Coordinate) -> Station {
        Station {
            id: "11240".to_string(),
            latitude: lat,
            longitude: lon,
            name: "GRAZ-THALERHOF-FLUGHAFEN".to_string(),
            state: None,
            altitude: None,
        }
    }

    #[test]
    fn distance_is_squared_euclidean() {
        let s = station(Coordinate::Decimal(47.0), Coordinate::Decimal(15.0));
        let d = s.distance_2(46.0, 17.0).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn unparsed_coordinate_has_no_position() {
        let s = station(
            Coordinate::Unparsed("unbekannt".to_string()),
            Coordinate::Decimal(15.0),
        );
        assert_eq!(s.position(), None);
        assert_eq!(s.distance_2(46.0, 15.0), None);
        assert_eq!(s.latitude.to_string(), "unbekannt");
    }
}
