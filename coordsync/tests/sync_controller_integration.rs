//! Integration tests for the coordinate-sync controller.
//!
//! These tests wire the controller to real transport code:
//! - RemoteTransformService → SpawnedConversionClient → controller
//! - TokioScheduler debounce with paused tokio time
//! - Out-of-order responses across forward and inverse conversions
//!
//! Run with: `cargo test --test sync_controller_integration`

use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::LocalSet;

use coordsync::coord::{from_web_mercator, to_web_mercator, GeoBounds, LonLat};
use coordsync::sync::{
    Collaborators, ConversionStatus, CoordinateFields, CoordinateSyncController, Field,
    ManualScheduler, MapView, MemoryFields, MemoryMapView, SubmitOutcome, SyncConfig,
    TokioScheduler,
};
use coordsync::transform::{
    AsyncHttpClient, ConversionCallback, ConversionClient, Direction, Point,
    RemoteTransformService, SpawnedConversionClient, TransformError, TransformRequest,
};

// ============================================================================
// Fake transformation service
// ============================================================================

/// Scale between degrees and projected units of the fake projection.
const SCALE: f64 = 100_000.0;

fn project(x: f64, y: f64, direction: Direction) -> (f64, f64) {
    match direction {
        Direction::Forward => (x * SCALE, y * SCALE),
        Direction::Inverse => (x / SCALE, y / SCALE),
    }
}

/// HTTP client answering like a transformation service with a linear
/// projection, after a fixed latency.
#[derive(Clone)]
struct FakeServiceHttp {
    latency: Duration,
    status: Option<u16>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl FakeServiceHttp {
    fn new(latency: Duration) -> Self {
        Self {
            latency,
            status: None,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::new(Duration::from_millis(10))
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl AsyncHttpClient for FakeServiceHttp {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransformError> {
        self.requested.lock().unwrap().push(url.to_string());
        tokio::time::sleep(self.latency).await;

        if let Some(status) = self.status {
            return Err(TransformError::Status {
                status,
                url: url.to_string(),
            });
        }

        let parsed = reqwest::Url::parse(url).map_err(|e| TransformError::Http(e.to_string()))?;
        let mut x = 0.0;
        let mut y = 0.0;
        let mut direction = Direction::Forward;
        for (name, value) in parsed.query_pairs() {
            match name.as_ref() {
                "x" => x = value.parse().unwrap(),
                "y" => y = value.parse().unwrap(),
                "source_srs" => direction = Direction::Inverse,
                _ => {}
            }
        }

        let (px, py) = project(x, y, direction);
        Ok(format!(r#"{{"x": {}, "y": {}}}"#, px, py).into_bytes())
    }
}

/// Conversion client that answers before `request` returns.
#[derive(Default)]
struct ImmediateClient {
    count: std::cell::Cell<usize>,
}

impl ConversionClient for ImmediateClient {
    fn request(&self, request: TransformRequest, on_complete: ConversionCallback) {
        self.count.set(self.count.get() + 1);
        let (x, y) = project(request.x, request.y, request.direction);
        on_complete(Ok(Point::new(x, y)));
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

struct Widget {
    controller: Rc<CoordinateSyncController>,
    map: Rc<MemoryMapView>,
    fields: Rc<MemoryFields>,
}

impl Widget {
    fn text(&self, field: Field) -> String {
        self.fields.text(field)
    }
}

fn bern() -> LonLat {
    LonLat::new(7.4474, 46.948)
}

fn build(
    client: Rc<dyn ConversionClient>,
    scheduler: Rc<dyn coordsync::sync::Scheduler>,
) -> Widget {
    let map = Rc::new(MemoryMapView::new(to_web_mercator(bern())));
    let fields = Rc::new(MemoryFields::new());

    let controller = CoordinateSyncController::new(
        SyncConfig::new("EPSG:2056".parse().unwrap()),
        Collaborators {
            map: map.clone(),
            fields: fields.clone(),
            client,
            scheduler,
        },
    );
    map.set_listener(controller.map_listener());

    Widget {
        controller,
        map,
        fields,
    }
}

/// Builds a widget backed by the remote service stack. Must run inside a
/// `LocalSet`.
fn build_remote(http: FakeServiceHttp) -> Widget {
    let service = RemoteTransformService::new("http://transform.test/api", http).unwrap();
    build(
        Rc::new(SpawnedConversionClient::new(service)),
        Rc::new(TokioScheduler::new()),
    )
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Map startup fills lon/lat at once and east/north after the debounce window.
#[tokio::test(start_paused = true)]
async fn test_startup_forward_conversion() {
    let http = FakeServiceHttp::new(Duration::from_millis(50));

    LocalSet::new()
        .run_until(async {
            let widget = build_remote(http.clone());
            widget.controller.start();

            assert_eq!(widget.text(Field::Lon), "7.447400");
            assert_eq!(widget.text(Field::Lat), "46.948000");
            assert_eq!(widget.text(Field::East), "");

            tokio::time::sleep(Duration::from_millis(400)).await;
            assert!(http.requested().is_empty());

            tokio::time::sleep(Duration::from_millis(200)).await;
            assert_eq!(http.requested().len(), 1);
            assert!(http.requested()[0].contains("target_srs=EPSG%3A2056"));

            assert_eq!(widget.text(Field::East), "744740.00");
            assert_eq!(widget.text(Field::North), "4694800.00");
            assert_eq!(widget.controller.status(), ConversionStatus::Idle);
        })
        .await;
}

/// A burst of map moves produces one request with the final center.
#[tokio::test(start_paused = true)]
async fn test_pan_burst_is_debounced() {
    let http = FakeServiceHttp::new(Duration::from_millis(20));

    LocalSet::new()
        .run_until(async {
            let widget = build_remote(http.clone());

            for _ in 0..5 {
                widget.map.pan(250.0, -100.0);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            tokio::time::sleep(Duration::from_millis(600)).await;

            let requested = http.requested();
            assert_eq!(requested.len(), 1);

            let center = from_web_mercator(widget.map.center());
            let expected_east = format!("{:.2}", center.lon * SCALE);
            assert_eq!(widget.text(Field::East), expected_east);
        })
        .await;
}

/// East/north submission converts immediately and keeps the typed text.
#[tokio::test(start_paused = true)]
async fn test_east_north_round_trip() {
    let http = FakeServiceHttp::new(Duration::from_millis(50));

    LocalSet::new()
        .run_until(async {
            let widget = build_remote(http.clone());
            widget.fields.set_text(Field::East, "800000");
            widget.fields.set_text(Field::North, "4700000");

            let outcome = widget.controller.on_east_north_submitted("800000", "4700000");
            assert_eq!(outcome, SubmitOutcome::Applied);
            assert_eq!(widget.text(Field::Lon), "");

            tokio::time::sleep(Duration::from_millis(60)).await;
            assert!(http.requested()[0].contains("source_srs=EPSG%3A2056"));
            assert_eq!(widget.text(Field::Lon), "8.000000");
            assert_eq!(widget.text(Field::Lat), "47.000000");
            assert_eq!(widget.text(Field::East), "800000");
            assert_eq!(widget.text(Field::North), "4700000");

            tokio::time::sleep(Duration::from_secs(2)).await;
            assert_eq!(http.requested().len(), 1);

            let center = from_web_mercator(widget.map.center());
            assert!((center.lon - 8.0).abs() < 1e-9);
            assert!((center.lat - 47.0).abs() < 1e-9);
        })
        .await;
}

/// A slow forward response that lands after an east/north submission must
/// not overwrite the submitted values.
#[tokio::test(start_paused = true)]
async fn test_late_forward_response_is_discarded() {
    let http = FakeServiceHttp::new(Duration::from_millis(300));

    LocalSet::new()
        .run_until(async {
            let widget = build_remote(http.clone());
            widget.controller.on_lon_lat_submitted("7.5", "46.9");

            // Forward request goes out at 500ms and answers at 800ms.
            tokio::time::sleep(Duration::from_millis(600)).await;
            assert_eq!(http.requested().len(), 1);

            widget.fields.set_text(Field::East, "760000");
            widget.fields.set_text(Field::North, "4680000");
            widget.controller.on_east_north_submitted("760000", "4680000");

            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(http.requested().len(), 2);
            assert_eq!(widget.text(Field::East), "760000");
            assert_eq!(widget.text(Field::North), "4680000");
            assert_eq!(widget.text(Field::Lon), "7.600000");
            assert_eq!(widget.text(Field::Lat), "46.800000");
        })
        .await;
}

/// Service errors become a visible failed status.
#[tokio::test(start_paused = true)]
async fn test_service_failure_is_reported() {
    let http = FakeServiceHttp::failing(503);

    LocalSet::new()
        .run_until(async {
            let widget = build_remote(http);
            widget.controller.on_lon_lat_submitted("7.5", "46.9");

            tokio::time::sleep(Duration::from_secs(1)).await;

            match widget.fields.status() {
                ConversionStatus::Failed(reason) => assert!(reason.contains("503")),
                other => panic!("expected failure, got {:?}", other),
            }
            assert_eq!(widget.text(Field::East), "");
            assert_eq!(widget.text(Field::Lon), "");
        })
        .await;
}

/// A client that completes synchronously inside `request` works with the
/// manual scheduler, with no runtime at all.
#[test]
fn test_synchronous_client_with_manual_clock() {
    let client = Rc::new(ImmediateClient::default());
    let scheduler = Rc::new(ManualScheduler::new());
    let widget = build(client.clone(), scheduler.clone());

    widget.controller.on_east_north_submitted("750000", "4650000");
    assert_eq!(client.count.get(), 1);
    assert_eq!(widget.text(Field::Lon), "7.500000");
    assert_eq!(widget.text(Field::Lat), "46.500000");
    assert!(!widget.controller.is_conversion_pending());

    widget.fields.set_text(Field::Lon, "8");
    widget.fields.set_text(Field::Lat, "47");
    widget.controller.on_lon_lat_submitted("8", "47");
    scheduler.advance(Duration::from_millis(499));
    assert_eq!(client.count.get(), 1);

    scheduler.advance(Duration::from_millis(1));
    assert_eq!(client.count.get(), 2);
    assert_eq!(widget.text(Field::East), "800000.00");
    assert_eq!(widget.text(Field::Lon), "8");
}

/// A geocoder result recenters the map; the move flows through the
/// controller like any other.
#[test]
fn test_geocoder_fit_recenters_through_map() {
    let client = Rc::new(ImmediateClient::default());
    let scheduler = Rc::new(ManualScheduler::new());
    let widget = build(client.clone(), scheduler.clone());

    let bounds = GeoBounds::new(8.4, 47.3, 8.6, 47.4).unwrap();
    widget.map.set_center(to_web_mercator(bounds.center()));

    assert_eq!(widget.text(Field::Lon), "8.500000");
    assert_eq!(widget.text(Field::Lat), "47.350000");

    scheduler.advance(Duration::from_millis(500));
    assert_eq!(client.count.get(), 1);
    assert_eq!(widget.text(Field::East), "850000.00");
    assert_eq!(
        widget.controller.projected_text(),
        Some("850000.00, 4735000.00".to_string())
    );
}
