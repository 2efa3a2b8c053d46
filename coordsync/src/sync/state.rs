//! Controller state types.

use std::fmt;

use crate::coord::{EastNorth, LonLat, Srs};
use crate::transform::Direction;

/// The authoritative position of the widget.
///
/// `lon`/`lat` and `projected` name the same physical point, except while a
/// conversion is pending. `projected` is `None` from the moment a forward
/// conversion is scheduled until its result is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Projected reference system of the session.
    pub srs: Srs,
    pub lon: f64,
    pub lat: f64,
    pub projected: Option<EastNorth>,
}

impl Position {
    pub fn new(srs: Srs, point: LonLat) -> Self {
        Self {
            srs,
            lon: point.lon,
            lat: point.lat,
            projected: None,
        }
    }

    pub fn geographic(&self) -> LonLat {
        LonLat::new(self.lon, self.lat)
    }
}

/// Fields the current update must leave alone because the user just typed them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppressionFlags {
    pub keep_lon_lat: bool,
    pub keep_east_north: bool,
}

impl SuppressionFlags {
    pub fn with_keep_lon_lat(mut self) -> Self {
        self.keep_lon_lat = true;
        self
    }

    pub fn with_keep_east_north(mut self) -> Self {
        self.keep_east_north = true;
        self
    }
}

/// Reentrancy guard of the geographic update path.
///
/// An update that arrives while another is `Updating` is dropped, never
/// queued. This happens when recentering the map raises a move notification
/// synchronously.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateGuard {
    #[default]
    Idle,
    Updating,
}

/// Identifies an outstanding conversion request.
///
/// A result is applied only while its generation is still the controller's
/// current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub generation: u64,
    pub direction: Direction,
}

/// Conversion state as shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversionStatus {
    /// Nothing pending; both representations agree.
    #[default]
    Idle,
    /// A forward conversion is waiting for the debounce window to pass.
    Scheduled,
    /// A request is outstanding at the transformation service.
    InFlight,
    /// The last conversion failed; the projected fields stay blank.
    Failed(String),
}

impl ConversionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ConversionStatus::Scheduled | ConversionStatus::InFlight)
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStatus::Idle => write!(f, "idle"),
            ConversionStatus::Scheduled => write!(f, "scheduled"),
            ConversionStatus::InFlight => write!(f, "converting"),
            ConversionStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Result of a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Applied,
    /// The input did not parse as two finite numbers; nothing changed.
    Ignored,
}
