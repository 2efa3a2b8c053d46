//! Bidirectional coordinate-sync controller.
//!
//! # Update Flow
//!
//! ```text
//! map moved ───────────┐
//! lon/lat submitted ───┼──► update_geographic ──► schedule_conversion ──(500ms)──► forward request
//!                      │          │                                                     │
//!                      │          └──► map.set_center (echo dropped by guard)          ▼
//!                      │                                                   apply_conversion_result
//! east/north submitted ──► inverse request ──► update_geographic (keep east/north)
//! ```
//!
//! Each accepted position change bumps a generation counter. Conversion
//! results carry the generation they were issued for and are discarded once
//! it is no longer current, so a slow response can never overwrite a newer
//! position.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::coord::{
    from_web_mercator, parse_coordinate, to_web_mercator, EastNorth, LonLat, Srs, WebMercator,
};
use crate::transform::{ConversionClient, Direction, Point, TransformError, TransformRequest};

use super::collaborators::{CoordinateFields, Field, MapView};
use super::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use super::scheduler::Scheduler;
use super::state::{
    ConversionStatus, Position, RequestTicket, SubmitOutcome, SuppressionFlags, UpdateGuard,
};

/// Decimals shown in the lon/lat fields.
const LON_LAT_DECIMALS: usize = 6;

/// Controller settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Projected reference system of the session.
    pub srs: Srs,
    /// Quiet period before a forward conversion fires.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            srs: Srs::geographic(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl SyncConfig {
    pub fn new(srs: Srs) -> Self {
        Self {
            srs,
            ..Default::default()
        }
    }

    pub fn with_srs(mut self, srs: Srs) -> Self {
        self.srs = srs;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Everything the controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub map: Rc<dyn MapView>,
    pub fields: Rc<dyn CoordinateFields>,
    pub client: Rc<dyn ConversionClient>,
    pub scheduler: Rc<dyn Scheduler>,
}

/// Keeps the geographic and projected representations of one position in
/// agreement.
///
/// The controller is single-threaded and shared through `Rc`. All entry
/// points take `&self`, so a collaborator may call back into it while an
/// update is running; the reentrancy guard drops such calls.
pub struct CoordinateSyncController {
    this: Weak<Self>,
    map: Rc<dyn MapView>,
    fields: Rc<dyn CoordinateFields>,
    client: Rc<dyn ConversionClient>,
    debounce: Debouncer,
    position: RefCell<Position>,
    flags: Cell<SuppressionFlags>,
    guard: Cell<UpdateGuard>,
    generation: Cell<u64>,
    in_flight: Cell<Option<RequestTicket>>,
    status: RefCell<ConversionStatus>,
}

impl CoordinateSyncController {
    /// Creates a controller positioned at the map's current center.
    ///
    /// Fields are not touched until [`start`](Self::start) or the first event.
    pub fn new(config: SyncConfig, collaborators: Collaborators) -> Rc<Self> {
        let Collaborators {
            map,
            fields,
            client,
            scheduler,
        } = collaborators;
        let initial = from_web_mercator(map.center());

        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            map,
            fields,
            client,
            debounce: Debouncer::new(scheduler, config.debounce),
            position: RefCell::new(Position::new(config.srs, initial)),
            flags: Cell::new(SuppressionFlags::default()),
            guard: Cell::new(UpdateGuard::Idle),
            generation: Cell::new(0),
            in_flight: Cell::new(None),
            status: RefCell::new(ConversionStatus::Idle),
        })
    }

    /// Returns a listener that forwards map moves to this controller.
    ///
    /// The listener holds a weak reference and does nothing once the
    /// controller is dropped.
    pub fn map_listener(&self) -> impl Fn(WebMercator) + 'static {
        let this = self.this.clone();
        move |center| {
            if let Some(controller) = this.upgrade() {
                controller.on_map_moved(center);
            }
        }
    }

    /// Populates the fields from the map's current center.
    pub fn start(&self) {
        self.on_map_moved(self.map.center());
    }

    pub fn srs(&self) -> Srs {
        self.position.borrow().srs.clone()
    }

    pub fn position(&self) -> Position {
        self.position.borrow().clone()
    }

    pub fn status(&self) -> ConversionStatus {
        self.status.borrow().clone()
    }

    /// Whether a forward conversion is armed or any request is outstanding.
    pub fn is_conversion_pending(&self) -> bool {
        self.debounce.is_pending() || self.in_flight.get().is_some()
    }

    /// Current position generation.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Easting and northing field texts joined for the clipboard.
    ///
    /// `None` while either field is blank.
    pub fn projected_text(&self) -> Option<String> {
        let east = self.fields.text(Field::East);
        let north = self.fields.text(Field::North);
        if east.trim().is_empty() || north.trim().is_empty() {
            return None;
        }
        Some(format!("{}, {}", east.trim(), north.trim()))
    }

    /// The map view center changed, by pan, zoom, or programmatic recenter.
    pub fn on_map_moved(&self, center: WebMercator) {
        self.update_geographic(from_web_mercator(center));
    }

    /// The user submitted the lon/lat form.
    ///
    /// Non-numeric input is ignored. The submitted texts stay in the fields
    /// as typed.
    pub fn on_lon_lat_submitted(&self, lon_text: &str, lat_text: &str) -> SubmitOutcome {
        let (Some(lon), Some(lat)) = (parse_coordinate(lon_text), parse_coordinate(lat_text)) else {
            debug!(lon = lon_text, lat = lat_text, "Ignoring non-numeric lon/lat submission");
            return SubmitOutcome::Ignored;
        };

        self.with_flags(SuppressionFlags::with_keep_lon_lat, || {
            self.update_geographic(LonLat::new(lon, lat))
        });
        SubmitOutcome::Applied
    }

    /// The user submitted the east/north form.
    ///
    /// Non-numeric input is ignored. Otherwise the submitted values become
    /// authoritative: lon/lat are cleared and refilled from an immediate
    /// inverse conversion, and the east/north fields keep the typed texts.
    pub fn on_east_north_submitted(&self, east_text: &str, north_text: &str) -> SubmitOutcome {
        let (Some(east), Some(north)) =
            (parse_coordinate(east_text), parse_coordinate(north_text))
        else {
            debug!(
                east = east_text,
                north = north_text,
                "Ignoring non-numeric east/north submission"
            );
            return SubmitOutcome::Ignored;
        };
        let projected = EastNorth::new(east, north);

        if self.debounce.cancel() {
            debug!("Cancelled pending forward conversion, east/north is authoritative");
        }
        self.bump_generation();

        let srs = {
            let mut position = self.position.borrow_mut();
            position.projected = Some(projected);
            position.srs.clone()
        };
        self.fields.clear(Field::Lon);
        self.fields.clear(Field::Lat);

        self.with_flags(SuppressionFlags::with_keep_east_north, || {
            if srs.is_geographic() {
                self.apply_inverse_result(LonLat::new(east, north));
            } else {
                self.issue_request(TransformRequest::inverse(projected, srs));
            }
        });
        SubmitOutcome::Applied
    }

    fn update_geographic(&self, point: LonLat) {
        if self.guard.get() == UpdateGuard::Updating {
            trace!(lon = point.lon, lat = point.lat, "Dropping reentrant geographic update");
            return;
        }
        self.guard.set(UpdateGuard::Updating);

        let flags = self.flags.get();
        self.bump_generation();
        {
            let mut position = self.position.borrow_mut();
            position.lon = point.lon;
            position.lat = point.lat;
        }

        if !flags.keep_lon_lat {
            self.fields
                .set_text(Field::Lon, &format!("{:.*}", LON_LAT_DECIMALS, point.lon));
            self.fields
                .set_text(Field::Lat, &format!("{:.*}", LON_LAT_DECIMALS, point.lat));
        }
        if !flags.keep_east_north {
            self.schedule_conversion();
        }

        self.map.set_center(to_web_mercator(point));

        self.guard.set(UpdateGuard::Idle);
    }

    fn schedule_conversion(&self) {
        self.position.borrow_mut().projected = None;
        self.fields.clear(Field::East);
        self.fields.clear(Field::North);

        let this = self.this.clone();
        self.debounce.arm(move || {
            if let Some(controller) = this.upgrade() {
                controller.fire_conversion();
            }
        });
        trace!(
            delay_ms = self.debounce.delay().as_millis() as u64,
            "Forward conversion scheduled"
        );
        self.set_status(ConversionStatus::Scheduled);
    }

    fn fire_conversion(&self) {
        let (point, srs) = {
            let position = self.position.borrow();
            (position.geographic(), position.srs.clone())
        };

        if srs.is_geographic() {
            self.apply_conversion_result(EastNorth::new(point.lon, point.lat));
        } else {
            self.issue_request(TransformRequest::forward(point, srs));
        }
    }

    fn issue_request(&self, request: TransformRequest) {
        let ticket = RequestTicket {
            generation: self.generation.get(),
            direction: request.direction,
        };
        self.in_flight.set(Some(ticket));
        self.set_status(ConversionStatus::InFlight);

        let this = self.this.clone();
        self.client.request(
            request,
            Box::new(move |result| {
                if let Some(controller) = this.upgrade() {
                    controller.on_conversion_complete(ticket, result);
                }
            }),
        );
    }

    fn on_conversion_complete(&self, ticket: RequestTicket, result: Result<Point, TransformError>) {
        if self.in_flight.get() == Some(ticket) {
            self.in_flight.set(None);
        }

        if ticket.generation != self.generation.get() {
            debug!(
                direction = %ticket.direction,
                issued = ticket.generation,
                current = self.generation.get(),
                "Discarding stale conversion result"
            );
            return;
        }

        match result {
            Ok(point) => match ticket.direction {
                Direction::Forward => {
                    self.apply_conversion_result(EastNorth::new(point.x, point.y))
                }
                Direction::Inverse => {
                    self.with_flags(SuppressionFlags::with_keep_east_north, || {
                        self.apply_inverse_result(LonLat::new(point.x, point.y))
                    })
                }
            },
            Err(error) => {
                warn!(
                    direction = %ticket.direction,
                    error = %error,
                    "Coordinate conversion failed"
                );
                self.set_status(ConversionStatus::Failed(error.to_string()));
            }
        }
    }

    fn apply_conversion_result(&self, projected: EastNorth) {
        if !self.flags.get().keep_east_north {
            let decimals = self.position.borrow().srs.display_decimals();
            self.fields
                .set_text(Field::East, &format!("{:.*}", decimals, projected.east));
            self.fields
                .set_text(Field::North, &format!("{:.*}", decimals, projected.north));
            self.position.borrow_mut().projected = Some(projected);
        }
        self.in_flight.set(None);
        self.set_status(ConversionStatus::Idle);
    }

    fn apply_inverse_result(&self, point: LonLat) {
        self.update_geographic(point);
        self.in_flight.set(None);
        self.set_status(ConversionStatus::Idle);
    }

    fn with_flags<R>(
        &self,
        set: fn(SuppressionFlags) -> SuppressionFlags,
        f: impl FnOnce() -> R,
    ) -> R {
        let previous = self.flags.get();
        self.flags.set(set(previous));
        let result = f();
        self.flags.set(previous);
        result
    }

    fn bump_generation(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    fn set_status(&self, status: ConversionStatus) {
        self.fields.set_status(&status);
        *self.status.borrow_mut() = status;
    }
}
