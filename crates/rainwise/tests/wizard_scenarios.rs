//! End-to-end wizard scenarios.
//!
//! Each test drives a full session against in-process fakes: a fixed-table
//! geocoder, scripted device geolocation and a recording assessment gateway.
//! Timer behaviour runs on a paused tokio clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;
use url::Url;

use rainwise::geocode::{GeocodeLookup, GeocodeStatus, StaticLookup};
use rainwise::location::{DeviceGeolocation, LocationError, Position, PositionOptions};
use rainwise::map::{MapMode, MapOptions, MapSurface, FOCUS_ZOOM};
use rainwise::session::{SessionError, SessionOptions};
use rainwise::submission::{
    AssessmentCreated, AssessmentGateway, AssessmentRequest, SubmissionError,
};
use rainwise::wizard::{WizardError, WizardStep};
use rainwise::{
    Capability, Coordinate, CoordinateSource, FormField, Notice, NoticeLevel, RoofType,
    WizardSession,
};

fn point(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

/// Device geolocation that replays scripted answers.
struct ScriptedGeolocation {
    answers: Mutex<VecDeque<Result<Position, LocationError>>>,
}

impl ScriptedGeolocation {
    fn new(answers: Vec<Result<Position, LocationError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
        }
    }
}

#[async_trait]
impl DeviceGeolocation for ScriptedGeolocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LocationError::unavailable("script exhausted")))
    }
}

/// Gateway that records requests and fails the first `failures` calls.
#[derive(Default)]
struct RecordingGateway {
    requests: Mutex<Vec<AssessmentRequest>>,
    failures: AtomicUsize,
}

impl RecordingGateway {
    fn failing(times: usize) -> Self {
        Self {
            failures: AtomicUsize::new(times),
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<AssessmentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssessmentGateway for RecordingGateway {
    async fn create(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentCreated, SubmissionError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(SubmissionError::Network("connection refused".into()));
        }
        Ok(AssessmentCreated {
            id: format!("a-{}", self.requests.lock().unwrap().len()),
        })
    }
}

fn start(
    lookup: Arc<dyn GeocodeLookup>,
    geolocation: Capability<Arc<dyn DeviceGeolocation>>,
) -> (WizardSession, UnboundedReceiver<Notice>) {
    let map = MapSurface::new(MapMode::Interactive, geolocation, MapOptions::default());
    let options = SessionOptions {
        results_url: Some(Url::parse("https://rain.example/results").unwrap()),
        ..SessionOptions::default()
    };
    WizardSession::new(lookup, map, options)
}

fn plain_session() -> (WizardSession, UnboundedReceiver<Notice>) {
    start(
        Arc::new(StaticLookup::new()),
        Capability::unavailable("no device"),
    )
}

fn drain(notices: &mut UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        out.push(notice);
    }
    out
}

#[tokio::test]
async fn click_then_drag_keeps_drag_point() {
    let (mut session, _notices) = plain_session();

    session.click_map(point(19.0760, 72.8777)).unwrap();
    session.drag_marker(point(19.0800, 72.8800)).unwrap();

    let stored = session.state().form.coordinate.unwrap();
    assert_eq!(stored.coordinate, point(19.0800, 72.8800));
    assert_eq!(stored.source, CoordinateSource::MarkerDrag);
    assert_eq!(session.map().marker(), Some(point(19.0800, 72.8800)));
}

#[tokio::test(start_paused = true)]
async fn bangalore_address_resolves_after_quiet_window() {
    let lookup = Arc::new(StaticLookup::new().with_place("Bangalore", point(12.9716, 77.5946)));
    let (mut session, mut notices) = start(lookup.clone(), Capability::unavailable("no device"));

    for text in ["B", "Ban", "Banga", "Bangalore"] {
        session.update(FormField::Location, text).unwrap();
        sleep(Duration::from_millis(200)).await;
    }
    assert!(lookup.queries().is_empty());

    sleep(Duration::from_millis(3000)).await;
    assert_eq!(lookup.queries(), vec!["Bangalore".to_string()]);
    assert_eq!(session.state().form.coordinate(), Some(point(12.9716, 77.5946)));
    assert!(matches!(
        session.geocode_status(),
        GeocodeStatus::Applied { .. }
    ));

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);

    let transition = session.sync_map().unwrap();
    assert_eq!(transition.to.center, point(12.9716, 77.5946));
    assert_eq!(transition.to.zoom, FOCUS_ZOOM);
}

#[tokio::test(start_paused = true)]
async fn drag_moves_marker_placed_by_geocoding() {
    let lookup = Arc::new(StaticLookup::new().with_place("Bangalore", point(12.9716, 77.5946)));
    let (mut session, mut notices) = start(lookup, Capability::unavailable("no device"));

    session.update(FormField::Location, "Bangalore").unwrap();
    sleep(Duration::from_millis(3100)).await;
    assert_eq!(session.state().form.coordinate(), Some(point(12.9716, 77.5946)));
    drain(&mut notices);

    // no explicit sync_map: the session follows the store on its own
    let moved = session.drag_marker(point(12.9750, 77.6000)).unwrap();
    assert_eq!(moved, point(12.9750, 77.6000));

    let stored = session.state().form.coordinate.unwrap();
    assert_eq!(stored.coordinate, point(12.9750, 77.6000));
    assert_eq!(stored.source, CoordinateSource::MarkerDrag);
    assert_eq!(session.map().marker(), Some(point(12.9750, 77.6000)));
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test(start_paused = true)]
async fn map_view_follows_geocoded_coordinate() {
    let lookup = Arc::new(StaticLookup::new().with_place("Pune", point(18.5204, 73.8567)));
    let (mut session, _notices) = start(lookup, Capability::unavailable("no device"));

    session.update(FormField::Location, "Pune").unwrap();
    sleep(Duration::from_millis(3100)).await;

    let view = session.map_view();
    assert_eq!(view.center, point(18.5204, 73.8567));
    assert_eq!(view.zoom, FOCUS_ZOOM);
    assert_eq!(session.map().marker(), Some(point(18.5204, 73.8567)));
}

#[tokio::test(start_paused = true)]
async fn lookup_survives_step_change() {
    let lookup = Arc::new(
        StaticLookup::new()
            .with_place("Chennai", point(13.0827, 80.2707))
            .with_latency(Duration::from_millis(800)),
    );
    let (session, _notices) = start(lookup, Capability::unavailable("no device"));

    session.update(FormField::Location, "Chennai").unwrap();
    sleep(Duration::from_millis(3100)).await;
    assert!(session.next());
    assert_eq!(session.state().step, WizardStep::Property);

    sleep(Duration::from_millis(1000)).await;
    assert_eq!(session.state().form.coordinate(), Some(point(13.0827, 80.2707)));
}

#[tokio::test(start_paused = true)]
async fn late_geocode_does_not_override_map_click() {
    let lookup = Arc::new(
        StaticLookup::new()
            .with_place("Bangalore", point(12.9716, 77.5946))
            .with_latency(Duration::from_millis(500)),
    );
    let (mut session, _notices) = start(lookup, Capability::unavailable("no device"));

    session.update(FormField::Location, "Bangalore").unwrap();
    sleep(Duration::from_millis(3100)).await;
    session.click_map(point(12.9352, 77.6245)).unwrap();
    sleep(Duration::from_millis(1000)).await;

    let stored = session.state().form.coordinate.unwrap();
    assert_eq!(stored.coordinate, point(12.9352, 77.6245));
    assert_eq!(stored.source, CoordinateSource::MapClick);
    assert!(matches!(
        session.geocode_status(),
        GeocodeStatus::Discarded { .. }
    ));
}

#[tokio::test]
async fn locate_overwrites_and_failure_keeps_previous() {
    let geolocation = ScriptedGeolocation::new(vec![
        Ok(Position::new(point(28.6139, 77.2090))),
        Err(LocationError::permission_denied("user declined")),
    ]);
    let (mut session, mut notices) = start(
        Arc::new(StaticLookup::new()),
        Capability::Available(Arc::new(geolocation)),
    );

    session.click_map(point(19.0760, 72.8777)).unwrap();
    assert_eq!(session.locate().await.unwrap(), point(28.6139, 77.2090));
    assert_eq!(session.state().form.coordinate(), Some(point(28.6139, 77.2090)));

    let err = session.locate().await.unwrap_err();
    assert!(matches!(err, SessionError::Map(_)));
    assert_eq!(session.state().form.coordinate(), Some(point(28.6139, 77.2090)));

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Unable to get location");
    assert_eq!(notices[0].description, "user declined");
}

#[tokio::test]
async fn navigation_is_bounded_and_never_gated() {
    let (session, _notices) = plain_session();

    assert!(!session.previous());
    assert_eq!(session.state().step.number(), 1);
    assert!(!session.state().issues().is_empty());

    for _ in 0..10 {
        session.next();
    }
    assert_eq!(session.state().step.number(), 4);
    assert_eq!(session.state().step_progress(), 100.0);
}

#[tokio::test]
async fn completion_tracks_ten_fields() {
    let (mut session, _notices) = plain_session();
    assert_eq!(session.state().completion, 0.0);

    session.update(FormField::Name, "Asha").unwrap();
    session.update(FormField::Location, "Pune").unwrap();
    session.update(FormField::Dwellers, "4").unwrap();
    assert_eq!(session.state().completion, 30.0);

    session.click_map(point(18.5204, 73.8567)).unwrap();
    assert_eq!(session.state().completion, 50.0);

    session.update(FormField::Name, "   ").unwrap();
    assert_eq!(session.state().completion, 40.0);
}

#[tokio::test]
async fn submit_applies_coercions_and_ends_session() {
    let (session, mut notices) = plain_session();
    session.update(FormField::Name, "Asha").unwrap();
    session.update(FormField::Location, "Pune").unwrap();
    session.update(FormField::Dwellers, "5").unwrap();
    session.update(FormField::RoofArea, "").unwrap();
    session.update(FormField::RoofType, "").unwrap();

    let gateway = RecordingGateway::default();
    let early = session.submit(&gateway).await.unwrap_err();
    assert!(matches!(
        early,
        SessionError::Submission(SubmissionError::Wizard(WizardError::NotAtFinalStep(1)))
    ));
    assert!(gateway.requests().is_empty());

    while session.next() {}
    let receipt = session.submit(&gateway).await.unwrap();

    let request = &gateway.requests()[0];
    assert_eq!(request.roof_area, 0.0);
    assert_eq!(request.roof_type, RoofType::Concrete);
    assert_eq!(request.dwellers, 5);

    let body = serde_json::to_value(request).unwrap();
    assert_eq!(body["roof_area"], serde_json::json!(0.0));
    assert_eq!(body["roof_type"], "concrete");

    assert_eq!(receipt.id, "a-1");
    assert_eq!(
        receipt.results_url.unwrap().as_str(),
        "https://rain.example/results?id=a-1"
    );
    assert!(session.state().closed);
    assert_eq!(
        session.update(FormField::Name, "late"),
        Err(WizardError::SessionClosed)
    );

    let levels: Vec<NoticeLevel> = drain(&mut notices).iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Error, NoticeLevel::Success]);
}

#[tokio::test]
async fn failed_submit_keeps_answers_for_retry() {
    let (session, mut notices) = plain_session();
    session.update(FormField::Name, "Ravi").unwrap();
    session.update(FormField::RoofArea, "120").unwrap();
    while session.next() {}

    let gateway = RecordingGateway::failing(1);
    assert!(session.submit(&gateway).await.is_err());

    let state = session.state();
    assert!(!state.closed);
    assert_eq!(state.form.name, "Ravi");
    assert_eq!(state.form.roof_area, "120");
    assert_eq!(state.step, WizardStep::Review);

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.title, "Submission failed");

    let receipt = session.submit(&gateway).await.unwrap();
    assert_eq!(receipt.request.roof_area, 120.0);
    assert_eq!(gateway.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_session_cancels_pending_lookup() {
    let lookup = Arc::new(StaticLookup::new().with_place("Bangalore", point(12.9716, 77.5946)));
    let (session, _notices) = start(lookup.clone(), Capability::unavailable("no device"));
    let store = session.store().clone();

    session.update(FormField::Location, "Bangalore").unwrap();
    drop(session);
    sleep(Duration::from_millis(5000)).await;

    assert!(lookup.queries().is_empty());
    assert!(store.is_closed());
    assert_eq!(store.snapshot().form.coordinate, None);
}
