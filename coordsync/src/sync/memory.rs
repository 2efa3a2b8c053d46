//! In-memory collaborators.
//!
//! [`MemoryMapView`] behaves like a browser map widget: every center change,
//! programmatic or not, synchronously notifies the registered listener.
//! [`MemoryFields`] stores field texts. Hosts without a real map or form use
//! these directly; the terminal session and the tests do.

use std::cell::{Cell, RefCell};

use crate::coord::WebMercator;

use super::collaborators::{CoordinateFields, Field, MapView};
use super::state::ConversionStatus;

type MoveListener = Box<dyn Fn(WebMercator)>;

/// Map view holding only a center point.
pub struct MemoryMapView {
    center: Cell<WebMercator>,
    listener: RefCell<Option<MoveListener>>,
    recenter_count: Cell<usize>,
}

impl MemoryMapView {
    pub fn new(center: WebMercator) -> Self {
        Self {
            center: Cell::new(center),
            listener: RefCell::new(None),
            recenter_count: Cell::new(0),
        }
    }

    /// Registers the center-changed listener, replacing any previous one.
    pub fn set_listener(&self, listener: impl Fn(WebMercator) + 'static) {
        *self.listener.borrow_mut() = Some(Box::new(listener));
    }

    /// Moves the view by an offset in meters, as a user drag would.
    pub fn pan(&self, dx: f64, dy: f64) {
        self.set_center(self.center.get().offset(dx, dy));
    }

    /// Number of `set_center` calls so far, including pans.
    pub fn recenter_count(&self) -> usize {
        self.recenter_count.get()
    }

    fn notify(&self, center: WebMercator) {
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(center);
        }
    }
}

impl MapView for MemoryMapView {
    fn center(&self) -> WebMercator {
        self.center.get()
    }

    fn set_center(&self, center: WebMercator) {
        self.center.set(center);
        self.recenter_count.set(self.recenter_count.get() + 1);
        self.notify(center);
    }
}

/// Field texts and last reported status.
#[derive(Default)]
pub struct MemoryFields {
    lon: RefCell<String>,
    lat: RefCell<String>,
    east: RefCell<String>,
    north: RefCell<String>,
    status: RefCell<ConversionStatus>,
}

impl MemoryFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last status reported by the controller.
    pub fn status(&self) -> ConversionStatus {
        self.status.borrow().clone()
    }

    fn slot(&self, field: Field) -> &RefCell<String> {
        match field {
            Field::Lon => &self.lon,
            Field::Lat => &self.lat,
            Field::East => &self.east,
            Field::North => &self.north,
        }
    }
}

impl CoordinateFields for MemoryFields {
    fn text(&self, field: Field) -> String {
        self.slot(field).borrow().clone()
    }

    fn set_text(&self, field: Field, text: &str) {
        let mut slot = self.slot(field).borrow_mut();
        slot.clear();
        slot.push_str(text);
    }

    fn set_status(&self, status: &ConversionStatus) {
        *self.status.borrow_mut() = status.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_set_center_notifies_listener() {
        let map = MemoryMapView::new(WebMercator::new(0.0, 0.0));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        map.set_listener(move |center| sink.borrow_mut().push(center));

        map.set_center(WebMercator::new(10.0, 20.0));
        map.pan(5.0, -5.0);

        assert_eq!(
            *seen.borrow(),
            vec![WebMercator::new(10.0, 20.0), WebMercator::new(15.0, 15.0)]
        );
        assert_eq!(map.center(), WebMercator::new(15.0, 15.0));
        assert_eq!(map.recenter_count(), 2);
    }

    #[test]
    fn test_listener_may_recenter_reentrantly() {
        let map = Rc::new(MemoryMapView::new(WebMercator::new(0.0, 0.0)));
        let depth = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(&map);
        let counter = Rc::clone(&depth);
        map.set_listener(move |center| {
            counter.set(counter.get() + 1);
            if counter.get() == 1 {
                if let Some(map) = weak.upgrade() {
                    map.set_center(center.offset(1.0, 1.0));
                }
            }
        });

        map.set_center(WebMercator::new(1.0, 1.0));
        assert_eq!(depth.get(), 2);
        assert_eq!(map.center(), WebMercator::new(2.0, 2.0));
    }

    #[test]
    fn test_fields_store_text() {
        let fields = MemoryFields::new();
        fields.set_text(Field::East, "2600000.00");
        assert_eq!(fields.text(Field::East), "2600000.00");

        fields.clear(Field::East);
        assert_eq!(fields.text(Field::East), "");
        assert_eq!(fields.text(Field::Lon), "");
    }

    #[test]
    fn test_fields_record_status() {
        let fields = MemoryFields::new();
        fields.set_status(&ConversionStatus::InFlight);
        assert_eq!(fields.status(), ConversionStatus::InFlight);
    }
}
