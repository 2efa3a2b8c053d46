//! Coordinate types and the map display projection.
//!
//! The map view works in spherical Web Mercator (EPSG:3857), which is neither
//! the geographic system the user types in nor the projected system the
//! transformation service targets. This module provides the conversions at
//! that boundary; the business projection itself is delegated to
//! [`crate::transform`].

mod types;

pub use types::{
    parse_coordinate, CoordError, EastNorth, GeoBounds, LonLat, Srs, WebMercator, EARTH_RADIUS,
    GEOGRAPHIC_SRS, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON, WEB_MERCATOR_SRS,
};

use std::f64::consts::FRAC_PI_4;

/// Converts geographic coordinates to the map display projection.
///
/// Latitudes beyond the Web Mercator limit are clamped to it.
#[inline]
pub fn to_web_mercator(point: LonLat) -> WebMercator {
    let lat = point.lat.clamp(MIN_LAT, MAX_LAT);
    let x = EARTH_RADIUS * point.lon.to_radians();
    let y = EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    WebMercator { x, y }
}

/// Converts a map display position back to geographic coordinates.
///
/// Longitude is wrapped into `[-180, 180]` since a panned map may report a
/// center beyond the antimeridian.
#[inline]
pub fn from_web_mercator(point: WebMercator) -> LonLat {
    let lon = normalize_lon((point.x / EARTH_RADIUS).to_degrees());
    let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
    LonLat { lon, lat }
}

/// Wraps a longitude into `[-180, 180]`.
#[inline]
pub fn normalize_lon(lon: f64) -> f64 {
    if (MIN_LON..=MAX_LON).contains(&lon) {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == MIN_LON && lon > 0.0 {
        MAX_LON
    } else {
        wrapped
    }
}
