//! Debounced, supersedable address geocoding.
//!
//! State machine: `Idle -> Pending -> Resolving -> Applied | Discarded | Failed`.
//!
//! Every address edit cancels the pending quiet-window timer and, when the
//! text is non-empty and differs from the last geocoded address, schedules a
//! new one that captures the text. When a timer fires, the lookup runs as a
//! detached task: later edits cancel timers but never the request itself.
//! A returning lookup is applied only if it belongs to the latest edit and
//! the live address still equals the text it was issued for.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{first_coordinate, GeocodeLookup};
use crate::models::{Coordinate, CoordinateSource};
use crate::notice::{Notice, NoticeSender};
use crate::resolver::{AcceptOutcome, CoordinateResolver};

/// Quiet window after the last keystroke before a lookup fires.
pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(3000);

/// Observable geocoder state.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeStatus {
    Idle,
    Pending { address: String },
    Resolving { address: String },
    Applied { address: String, coordinate: Coordinate },
    Discarded { address: String },
    Failed { address: String, reason: String },
}

struct Shared {
    lookup: Arc<dyn GeocodeLookup>,
    resolver: CoordinateResolver,
    notices: NoticeSender,
    status: watch::Sender<GeocodeStatus>,
    /// Bumped on every edit; a lookup may only land for its own generation.
    generation: AtomicU64,
    last_geocoded: Mutex<Option<String>>,
    shut_down: AtomicBool,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn set_status(&self, generation: u64, status: GeocodeStatus) {
        self.status.send_if_modified(|current| {
            if !self.is_current(generation) || *current == status {
                return false;
            }
            *current = status;
            true
        });
    }

    fn last_geocoded(&self) -> Option<String> {
        self.last_geocoded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn is_live(&self) -> bool {
        !self.shut_down.load(Ordering::SeqCst) && !self.resolver.store().is_closed()
    }

    async fn resolve(self: Arc<Self>, generation: u64, address: String) {
        if !self.is_live() {
            return;
        }
        self.set_status(
            generation,
            GeocodeStatus::Resolving {
                address: address.clone(),
            },
        );

        let issued_revision = self.resolver.revision();
        tracing::debug!(%address, "geocode lookup issued");
        let result = match self.lookup.search(&address).await {
            Ok(candidates) => first_coordinate(&candidates),
            Err(e) => Err(e),
        };

        let live = self.resolver.store().location_text();
        if !self.is_live() || !self.is_current(generation) || live.trim() != address {
            tracing::debug!(%address, "geocode result superseded, discarding");
            self.set_status(generation, GeocodeStatus::Discarded { address });
            return;
        }

        let coordinate = match result {
            Ok(coordinate) => coordinate,
            Err(e) => {
                if e.is_miss() {
                    tracing::warn!(%address, error = %e, "geocode miss");
                } else {
                    tracing::warn!(%address, error = %e, "geocode lookup failed");
                }
                self.set_status(
                    generation,
                    GeocodeStatus::Failed {
                        address,
                        reason: e.to_string(),
                    },
                );
                return;
            }
        };

        match self
            .resolver
            .accept_issued(coordinate, CoordinateSource::Geocode, issued_revision)
        {
            Ok(AcceptOutcome::Applied) => {
                *self.last_geocoded.lock().unwrap_or_else(|e| e.into_inner()) =
                    Some(address.clone());
                self.notices.send(Notice::success(
                    "Location found",
                    format!("Pinned {} at {}", address, coordinate),
                ));
                self.set_status(
                    generation,
                    GeocodeStatus::Applied {
                        address,
                        coordinate,
                    },
                );
            }
            Ok(AcceptOutcome::Stale) => {
                self.set_status(generation, GeocodeStatus::Discarded { address });
            }
            Err(e) => {
                tracing::debug!(%address, error = %e, "geocode landed after session end");
                self.set_status(generation, GeocodeStatus::Discarded { address });
            }
        }
    }
}

/// Drives geocoding from address edits.
///
/// Must be used from within a tokio runtime: edits spawn the timer task.
pub struct DebouncedGeocoder {
    shared: Arc<Shared>,
    quiet_window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedGeocoder {
    pub fn new(
        lookup: Arc<dyn GeocodeLookup>,
        resolver: CoordinateResolver,
        notices: NoticeSender,
    ) -> Self {
        let (status, _rx) = watch::channel(GeocodeStatus::Idle);
        Self {
            shared: Arc::new(Shared {
                lookup,
                resolver,
                notices,
                status,
                generation: AtomicU64::new(0),
                last_geocoded: Mutex::new(None),
                shut_down: AtomicBool::new(false),
            }),
            quiet_window: DEFAULT_QUIET_WINDOW,
            pending: Mutex::new(None),
        }
    }

    pub fn with_quiet_window(mut self, quiet_window: Duration) -> Self {
        self.quiet_window = quiet_window;
        self
    }

    pub fn status(&self) -> GeocodeStatus {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GeocodeStatus> {
        self.shared.status.subscribe()
    }

    /// Address of the last successful geocode.
    pub fn last_geocoded(&self) -> Option<String> {
        self.shared.last_geocoded()
    }

    /// React to the address text changing to `text`.
    pub fn address_changed(&self, text: &str) {
        self.cancel_pending();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let address = text.trim().to_string();
        if !self.shared.is_live()
            || address.is_empty()
            || self.shared.last_geocoded().as_deref() == Some(address.as_str())
        {
            self.shared.set_status(generation, GeocodeStatus::Idle);
            return;
        }

        self.shared.set_status(
            generation,
            GeocodeStatus::Pending {
                address: address.clone(),
            },
        );

        let shared = Arc::clone(&self.shared);
        let quiet_window = self.quiet_window;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet_window).await;
            tokio::spawn(shared.resolve(generation, address));
        });

        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) = Some(timer);
    }

    /// Cancel the pending timer, if any. Lookups already in flight continue
    /// and are discarded on return.
    pub fn cancel_pending(&self) -> bool {
        match self.pending.lock().unwrap_or_else(|e| e.into_inner()).take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    /// Tear down: cancel the timer and neutralize in-flight lookups.
    pub fn shutdown(&self) {
        self.shared.shut_down.store(true, Ordering::SeqCst);
        self.cancel_pending();
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.set_status(generation, GeocodeStatus::Idle);
    }
}

impl Drop for DebouncedGeocoder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use super::*;
    use crate::geocode::{GeocodeCandidate, GeocodeError, StaticLookup};
    use crate::http_client::HttpError;
    use crate::models::FormField;
    use crate::notice;
    use crate::wizard::WizardStore;

    fn bangalore() -> Coordinate {
        Coordinate::new(12.9716, 77.5946).unwrap()
    }

    struct Fixture {
        store: WizardStore,
        geocoder: DebouncedGeocoder,
        notices: tokio::sync::mpsc::UnboundedReceiver<Notice>,
    }

    fn fixture(lookup: Arc<dyn GeocodeLookup>) -> Fixture {
        let store = WizardStore::new();
        let (tx, rx) = notice::channel();
        let geocoder = DebouncedGeocoder::new(lookup, CoordinateResolver::new(store.clone()), tx);
        Fixture {
            store,
            geocoder,
            notices: rx,
        }
    }

    impl Fixture {
        fn type_address(&self, text: &str) {
            self.store.update(FormField::Location, text).unwrap();
            self.geocoder.address_changed(text);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_quiet_window() {
        let lookup = Arc::new(StaticLookup::new().with_place("Bangalore", bangalore()));
        let mut fx = fixture(lookup.clone());

        fx.type_address("Bangalore");
        assert!(matches!(fx.geocoder.status(), GeocodeStatus::Pending { .. }));

        sleep(Duration::from_millis(2999)).await;
        assert!(lookup.queries().is_empty());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(lookup.queries(), vec!["Bangalore".to_string()]);
        assert_eq!(fx.store.snapshot().form.coordinate(), Some(bangalore()));
        assert_eq!(fx.geocoder.last_geocoded().as_deref(), Some("Bangalore"));

        let notice = fx.notices.try_recv().unwrap();
        assert_eq!(notice.level, crate::notice::NoticeLevel::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_restart_window() {
        let lookup = Arc::new(StaticLookup::new().with_place("Pune", bangalore()));
        let fx = fixture(lookup.clone());

        for text in ["P", "Pu", "Pun", "Pune"] {
            fx.type_address(text);
            sleep(Duration::from_millis(1000)).await;
        }
        assert!(lookup.queries().is_empty());

        sleep(Duration::from_millis(2100)).await;
        assert_eq!(lookup.queries(), vec!["Pune".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_result_discarded() {
        let lookup = Arc::new(
            StaticLookup::new()
                .with_place("Bangalore", bangalore())
                .with_latency(Duration::from_millis(500)),
        );
        let fx = fixture(lookup.clone());

        fx.type_address("Bangalore");
        sleep(Duration::from_millis(3100)).await;
        assert!(matches!(fx.geocoder.status(), GeocodeStatus::Resolving { .. }));

        // edit while the request is in flight
        fx.type_address("Bangalore Rural");
        sleep(Duration::from_millis(500)).await;

        assert_eq!(fx.store.snapshot().form.coordinate, None);
        assert_eq!(fx.geocoder.last_geocoded(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gesture_during_lookup_wins() {
        let lookup = Arc::new(
            StaticLookup::new()
                .with_place("Bangalore", bangalore())
                .with_latency(Duration::from_millis(500)),
        );
        let fx = fixture(lookup);
        let resolver = CoordinateResolver::new(fx.store.clone());
        let clicked = Coordinate::new(12.9352, 77.6245).unwrap();

        fx.type_address("Bangalore");
        sleep(Duration::from_millis(3100)).await;
        assert!(matches!(fx.geocoder.status(), GeocodeStatus::Resolving { .. }));
        resolver.accept(clicked, CoordinateSource::MapClick).unwrap();

        sleep(Duration::from_millis(600)).await;
        assert_eq!(fx.store.snapshot().form.coordinate(), Some(clicked));
        assert!(matches!(fx.geocoder.status(), GeocodeStatus::Discarded { .. }));
        assert_eq!(fx.geocoder.last_geocoded(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_as_last_geocoded_stays_idle() {
        let lookup = Arc::new(StaticLookup::new().with_place("Bangalore", bangalore()));
        let fx = fixture(lookup.clone());

        fx.type_address("Bangalore");
        sleep(Duration::from_millis(3100)).await;
        fx.type_address("Bangalore ");
        assert_eq!(fx.geocoder.status(), GeocodeStatus::Idle);
        sleep(Duration::from_millis(5000)).await;
        assert_eq!(lookup.queries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_address_cancels() {
        let lookup = Arc::new(StaticLookup::new());
        let fx = fixture(lookup.clone());

        fx.type_address("Mysore");
        sleep(Duration::from_millis(1000)).await;
        fx.type_address("   ");
        assert_eq!(fx.geocoder.status(), GeocodeStatus::Idle);
        sleep(Duration::from_millis(5000)).await;
        assert!(lookup.queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_is_silent() {
        let lookup = Arc::new(
            StaticLookup::new().with_candidates("Nowhere", vec![GeocodeCandidate::new("x", "y")]),
        );
        let mut fx = fixture(lookup);

        fx.type_address("Nowhere");
        sleep(Duration::from_millis(3100)).await;

        assert!(matches!(fx.geocoder.status(), GeocodeStatus::Failed { .. }));
        assert_eq!(fx.store.snapshot().form.coordinate, None);
        assert!(fx.notices.try_recv().is_err());
    }

    struct FailingLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodeLookup for FailingLookup {
        async fn search(&self, _address: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GeocodeError::Http(HttpError::Status {
                status: 503,
                body: "unavailable".into(),
            }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_keeps_wizard_usable() {
        let lookup = Arc::new(FailingLookup {
            calls: AtomicUsize::new(0),
        });
        let mut fx = fixture(lookup.clone());

        fx.type_address("Chennai");
        sleep(Duration::from_millis(3100)).await;

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(fx.geocoder.status(), GeocodeStatus::Failed { .. }));
        assert!(fx.notices.try_recv().is_err());
        assert!(fx.store.update(FormField::Dwellers, "4").unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_pending_timer() {
        let lookup = Arc::new(StaticLookup::new().with_place("Bangalore", bangalore()));
        let fx = fixture(lookup.clone());

        fx.type_address("Bangalore");
        sleep(Duration::from_millis(1000)).await;
        fx.geocoder.shutdown();
        sleep(Duration::from_millis(5000)).await;

        assert!(lookup.queries().is_empty());
        assert_eq!(fx.store.snapshot().form.coordinate, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_store_blocks_late_result() {
        let lookup = Arc::new(
            StaticLookup::new()
                .with_place("Bangalore", bangalore())
                .with_latency(Duration::from_millis(500)),
        );
        let fx = fixture(lookup.clone());

        fx.type_address("Bangalore");
        sleep(Duration::from_millis(3100)).await;
        fx.store.close();
        sleep(Duration::from_millis(1000)).await;

        assert_eq!(lookup.queries().len(), 1);
        assert_eq!(fx.store.snapshot().form.coordinate, None);
    }
}
