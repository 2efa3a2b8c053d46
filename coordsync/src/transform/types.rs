//! Request, response and error types for coordinate transformation.

use std::fmt;
use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

use crate::coord::{EastNorth, LonLat, Srs};

/// Errors that can occur while talking to a transformation service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The configured service URL cannot be used.
    #[error("Invalid service URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport-level failure (connection refused, TLS, DNS...).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The service did not answer within the client timeout.
    #[error("Request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// The response body is not a `{"x": .., "y": ..}` document.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Which way a transformation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Geographic lon/lat to the projected system.
    Forward,
    /// Projected system to geographic lon/lat.
    Inverse,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Inverse => "inverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single point transformation between EPSG:4326 and `srs`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    pub x: f64,
    pub y: f64,
    pub direction: Direction,
    /// The non-geographic side of the transformation.
    pub srs: Srs,
}

impl TransformRequest {
    /// Lon/lat to `srs`.
    pub fn forward(point: LonLat, srs: Srs) -> Self {
        Self {
            x: point.lon,
            y: point.lat,
            direction: Direction::Forward,
            srs,
        }
    }

    /// `srs` to lon/lat.
    pub fn inverse(point: EastNorth, srs: Srs) -> Self {
        Self {
            x: point.east,
            y: point.north,
            direction: Direction::Inverse,
            srs,
        }
    }

    /// Query parameters sent to the remote service.
    ///
    /// The direction is selected by naming `srs` either as the target
    /// (forward) or as the source (inverse).
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        let srs_param = match self.direction {
            Direction::Forward => "target_srs",
            Direction::Inverse => "source_srs",
        };
        [
            ("x", self.x.to_string()),
            ("y", self.y.to_string()),
            (srs_param, self.srs.to_string()),
        ]
    }
}

/// A transformed point, in the system opposite to the request's input.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A service that transforms single points.
pub trait TransformService {
    /// Transforms one point.
    fn transform(
        &self,
        request: &TransformRequest,
    ) -> impl Future<Output = Result<Point, TransformError>>;
}
