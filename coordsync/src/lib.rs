//! coordsync - Geographic/projected coordinate synchronization
//!
//! This library keeps a map view, a lon/lat form and an east/north form in
//! agreement, converting between the geographic reference system and one
//! projected reference system through a remote transformation service.
//!
//! - [`coord`]: coordinate types and the Web Mercator display projection
//! - [`transform`]: the transformation service client
//! - [`sync`]: the coordinate-sync controller and its collaborators
//! - [`config`]: the INI configuration file
//! - [`logging`]: tracing setup

pub mod config;
pub mod coord;
pub mod logging;
pub mod sync;
pub mod transform;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
