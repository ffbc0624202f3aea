use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use climatelens::LatLon;
///
/// let de_bilt = LatLon(52.1015, 5.1779);
/// assert_eq!(de_bilt.0, 52.1015); // Latitude
/// assert_eq!(de_bilt.1, 5.1779); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    /// Coordinates rounded to 4 decimals (about 11 m), used as a cache key.
    pub(crate) fn cache_key(self) -> (i64, i64) {
        (
            (self.0 * 10_000.0).round() as i64,
            (self.1 * 10_000.0).round() as i64,
        )
    }
}

/// A named place picked on the map or found through geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn coordinate(&self) -> LatLon {
        LatLon(self.lat, self.lon)
    }

    /// Two selections point at the same place when their rounded coordinates match.
    pub fn same_place(&self, other: &Location) -> bool {
        self.coordinate().cache_key() == other.coordinate().cache_key()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.4}, {:.4})", self.name, self.lat, self.lon)
    }
}
