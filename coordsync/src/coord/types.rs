//! Core coordinate types.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Identifier of the geographic reference system (WGS 84 lon/lat).
pub const GEOGRAPHIC_SRS: &str = "EPSG:4326";

/// Identifier of the map display projection (spherical Web Mercator).
pub const WEB_MERCATOR_SRS: &str = "EPSG:3857";

/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;

/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;

/// Sphere radius used by Web Mercator, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Errors produced while building or parsing coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid spatial reference system: {0:?}")]
    InvalidSrs(String),

    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),

    #[error("Bounding box is empty or inverted")]
    InvalidBounds,
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lon, self.lat)
    }
}

/// Projected position in the units of the session's reference system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EastNorth {
    pub east: f64,
    pub north: f64,
}

impl EastNorth {
    pub fn new(east: f64, north: f64) -> Self {
        Self { east, north }
    }
}

/// Position in the map's display projection (EPSG:3857 meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    pub x: f64,
    pub y: f64,
}

impl WebMercator {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by the given offset in meters.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A spatial reference system identifier such as `EPSG:2056`.
///
/// Identifiers are normalized to the `AUTHORITY:CODE` form with an upper-case
/// authority. A bare numeric code is taken to be an EPSG code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Srs(String);

impl Srs {
    /// The geographic reference system (lon/lat degrees).
    pub fn geographic() -> Self {
        Self(GEOGRAPHIC_SRS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether conversions to this system are the identity.
    pub fn is_geographic(&self) -> bool {
        self.0 == GEOGRAPHIC_SRS
    }

    /// Number of decimals used when displaying coordinates in this system.
    pub fn display_decimals(&self) -> usize {
        if self.is_geographic() {
            6
        } else {
            2
        }
    }
}

impl FromStr for Srs {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (authority, code) = match trimmed.split_once(':') {
            Some((authority, code)) => (authority.trim(), code.trim()),
            None => ("EPSG", trimmed),
        };

        if authority.is_empty()
            || !authority.chars().all(|c| c.is_ascii_alphabetic())
            || code.is_empty()
            || !code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(CoordError::InvalidSrs(s.to_string()));
        }

        Ok(Self(format!("{}:{}", authority.to_ascii_uppercase(), code)))
    }
}

impl fmt::Display for Srs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic bounding box, as supplied by a geocoder result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Creates a bounding box, rejecting inverted or out-of-range extents.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, CoordError> {
        for lon in [min_lon, max_lon] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        for lat in [min_lat, max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(CoordError::InvalidBounds);
        }

        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    pub fn center(&self) -> LonLat {
        LonLat::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// Parses user-entered coordinate text.
///
/// Returns `None` unless the text is a finite number. Surrounding whitespace
/// is ignored.
pub fn parse_coordinate(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srs_parse_normalizes_authority() {
        let srs: Srs = "epsg:2056".parse().unwrap();
        assert_eq!(srs.as_str(), "EPSG:2056");
    }

    #[test]
    fn test_srs_parse_bare_code() {
        let srs: Srs = " 21781 ".parse().unwrap();
        assert_eq!(srs.as_str(), "EPSG:21781");
    }

    #[test]
    fn test_srs_parse_rejects_garbage() {
        assert!("".parse::<Srs>().is_err());
        assert!("EPSG:".parse::<Srs>().is_err());
        assert!("EPSG:20 56".parse::<Srs>().is_err());
        assert!(":2056".parse::<Srs>().is_err());
    }

    #[test]
    fn test_geographic_srs() {
        assert!(Srs::geographic().is_geographic());
        assert!("4326".parse::<Srs>().unwrap().is_geographic());
        assert!(!"EPSG:2056".parse::<Srs>().unwrap().is_geographic());
    }

    #[test]
    fn test_display_decimals() {
        assert_eq!(Srs::geographic().display_decimals(), 6);
        assert_eq!("EPSG:2056".parse::<Srs>().unwrap().display_decimals(), 2);
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("7.5"), Some(7.5));
        assert_eq!(parse_coordinate("  -46.25 "), Some(-46.25));
        assert_eq!(parse_coordinate("2600000"), Some(2_600_000.0));
        assert_eq!(parse_coordinate("abc"), None);
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("NaN"), None);
        assert_eq!(parse_coordinate("inf"), None);
    }

    #[test]
    fn test_bounds_center() {
        let bounds = GeoBounds::new(6.0, 46.0, 8.0, 48.0).unwrap();
        assert_eq!(bounds.center(), LonLat::new(7.0, 47.0));
    }

    #[test]
    fn test_bounds_rejects_inverted() {
        assert_eq!(
            GeoBounds::new(8.0, 46.0, 6.0, 48.0),
            Err(CoordError::InvalidBounds)
        );
        assert!(matches!(
            GeoBounds::new(0.0, -91.0, 1.0, 1.0),
            Err(CoordError::InvalidLatitude(_))
        ));
    }
}
