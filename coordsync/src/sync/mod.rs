//! Coordinate synchronization.
//!
//! The [`CoordinateSyncController`] keeps a map view, a lon/lat form and an
//! east/north form showing the same position. It is wired to its
//! surroundings through traits:
//!
//! - [`MapView`] and [`CoordinateFields`] for the UI
//! - [`ConversionClient`](crate::transform::ConversionClient) for the
//!   transformation service
//! - [`Scheduler`] for the debounce timer
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use coordsync::sync::{Collaborators, CoordinateSyncController, MemoryFields,
//!     MemoryMapView, SyncConfig, TokioScheduler};
//!
//! let map = Rc::new(MemoryMapView::new(center));
//! let controller = CoordinateSyncController::new(
//!     SyncConfig::new("EPSG:2056".parse()?),
//!     Collaborators {
//!         map: map.clone(),
//!         fields: Rc::new(MemoryFields::new()),
//!         client: Rc::new(client),
//!         scheduler: Rc::new(TokioScheduler::new()),
//!     },
//! );
//! map.set_listener(controller.map_listener());
//! controller.start();
//! ```

mod collaborators;
mod controller;
mod debounce;
mod memory;
mod scheduler;
mod state;

pub use collaborators::{CoordinateFields, Field, MapView};
pub use controller::{Collaborators, CoordinateSyncController, SyncConfig};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use memory::{MemoryFields, MemoryMapView};
pub use scheduler::{ManualScheduler, Scheduler, Task, TaskHandle, TaskState, TokioScheduler};
pub use state::{
    ConversionStatus, Position, RequestTicket, SubmitOutcome, SuppressionFlags, UpdateGuard,
};
