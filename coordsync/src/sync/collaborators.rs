//! Collaborators the controller is wired to.
//!
//! Both traits take `&self`: UI handles are shared and mutate through
//! interior mutability, which is also what allows a map view to call back
//! into the controller while it is recentering.

use std::fmt;

use crate::coord::WebMercator;

use super::state::ConversionStatus;

/// A map view whose center is expressed in the display projection.
pub trait MapView {
    fn center(&self) -> WebMercator;

    /// Recenters the view.
    ///
    /// Implementations may raise their center-changed notification before
    /// returning, including for programmatic moves.
    fn set_center(&self, center: WebMercator);
}

/// One of the four coordinate input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Lon,
    Lat,
    East,
    North,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Lon, Field::Lat, Field::East, Field::North];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Lon => "lon",
            Field::Lat => "lat",
            Field::East => "east",
            Field::North => "north",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The text inputs of the widget.
pub trait CoordinateFields {
    fn text(&self, field: Field) -> String;

    fn set_text(&self, field: Field, text: &str);

    fn clear(&self, field: Field) {
        self.set_text(field, "");
    }

    /// Shows the conversion state. The default implementation ignores it.
    fn set_status(&self, _status: &ConversionStatus) {}
}
