//! One wizard session.
//!
//! Wires the store, the coordinate resolver, the debounced geocoder and the
//! map surface together, and turns every recoverable failure into a notice.
//! Dropping the session (or submitting successfully) ends it: pending
//! geocode timers are cancelled and later writes are refused.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use url::Url;

use crate::geocode::{DebouncedGeocoder, GeocodeLookup, GeocodeStatus, DEFAULT_QUIET_WINDOW};
use crate::links;
use crate::map::{MapError, MapPick, MapSurface, MapView, ViewTransition};
use crate::models::{Coordinate, FormField};
use crate::notice::{self, Notice, NoticeSender};
use crate::resolver::CoordinateResolver;
use crate::submission::{
    AssessmentGateway, AssessmentRequest, SubmissionError, SubmissionReceipt,
};
use crate::wizard::{WizardError, WizardState, WizardStore};

/// Errors from session operations. All of them are recoverable.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl From<&MapError> for Notice {
    fn from(err: &MapError) -> Self {
        match err {
            MapError::UnsupportedCapability(reason) => {
                Notice::error("Geolocation not supported", reason.clone())
            }
            MapError::Location(e) => Notice::error("Unable to get location", e.message.clone()),
            MapError::ReadOnly | MapError::NoMarker => Notice::info("Map", err.to_string()),
        }
    }
}

impl From<&SessionError> for Notice {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::Map(e) => e.into(),
            SessionError::Wizard(e) => Notice::error("Wizard", e.to_string()),
            SessionError::Submission(SubmissionError::Wizard(e)) => {
                Notice::error("Cannot submit yet", e.to_string())
            }
            SessionError::Submission(e) => Notice::error(
                "Submission failed",
                format!("{}. Your answers are kept; try again.", e),
            ),
        }
    }
}

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub quiet_window: Duration,
    /// Base URL of the results page, for `?id=` deep links.
    pub results_url: Option<Url>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            quiet_window: DEFAULT_QUIET_WINDOW,
            results_url: None,
        }
    }
}

/// A running intake wizard.
pub struct WizardSession {
    store: WizardStore,
    resolver: CoordinateResolver,
    geocoder: DebouncedGeocoder,
    map: MapSurface,
    notices: NoticeSender,
    results_url: Option<Url>,
}

impl WizardSession {
    /// Start a session. The receiver yields notices for display, including
    /// those raised later by background geocoding.
    pub fn new(
        lookup: Arc<dyn GeocodeLookup>,
        map: MapSurface,
        options: SessionOptions,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, rx) = notice::channel();
        let store = WizardStore::new();
        let resolver = CoordinateResolver::new(store.clone());
        let geocoder = DebouncedGeocoder::new(lookup, resolver.clone(), notices.clone())
            .with_quiet_window(options.quiet_window);

        let session = Self {
            store,
            resolver,
            geocoder,
            map,
            notices,
            results_url: options.results_url,
        };
        (session, rx)
    }

    pub fn store(&self) -> &WizardStore {
        &self.store
    }

    pub fn state(&self) -> WizardState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<WizardState> {
        self.store.subscribe()
    }

    pub fn geocode_status(&self) -> GeocodeStatus {
        self.geocoder.status()
    }

    pub fn subscribe_geocode(&self) -> watch::Receiver<GeocodeStatus> {
        self.geocoder.subscribe()
    }

    /// The map surface, first brought in line with the stored coordinate.
    pub fn map(&mut self) -> &MapSurface {
        self.sync_map();
        &self.map
    }

    pub fn map_view(&mut self) -> MapView {
        self.sync_map();
        self.map.view()
    }

    /// Set a field. Address edits feed the geocoder.
    pub fn update(&self, field: FormField, value: &str) -> Result<bool, WizardError> {
        let changed = self.store.update(field, value)?;
        if changed && field == FormField::Location {
            self.geocoder.address_changed(value);
        }
        Ok(changed)
    }

    pub fn next(&self) -> bool {
        self.store.next()
    }

    pub fn previous(&self) -> bool {
        self.store.previous()
    }

    /// "Locate me". On failure the previous coordinate stays and a notice
    /// explains why.
    pub async fn locate(&mut self) -> Result<Coordinate, SessionError> {
        let pick = self.map.locate().await;
        self.apply_pick(pick)
    }

    pub fn click_map(&mut self, coordinate: Coordinate) -> Result<Coordinate, SessionError> {
        self.sync_map();
        let pick = self.map.click(coordinate);
        self.apply_pick(pick)
    }

    /// Drag the marker, wherever the last producer placed it.
    pub fn drag_marker(&mut self, resting: Coordinate) -> Result<Coordinate, SessionError> {
        self.sync_map();
        let pick = self.map.drag_end(resting);
        self.apply_pick(pick)
    }

    fn apply_pick(&mut self, pick: Result<MapPick, MapError>) -> Result<Coordinate, SessionError> {
        let result = pick.map_err(SessionError::from).and_then(|pick| {
            self.resolver.accept(pick.coordinate, pick.source)?;
            Ok(pick.coordinate)
        });
        match result {
            Ok(coordinate) => {
                self.sync_map();
                Ok(coordinate)
            }
            Err(e) => {
                tracing::debug!(error = %e, "map gesture not applied");
                self.notices.send(Notice::from(&e));
                Err(e)
            }
        }
    }

    /// Bring the map in line with the stored coordinate, which background
    /// geocoding may have changed.
    pub fn sync_map(&mut self) -> Option<ViewTransition> {
        let coordinate = self.store.snapshot().form.coordinate();
        self.map.sync_external(coordinate)
    }

    /// Google Earth link for measuring the roof.
    pub fn earth_link(&self) -> String {
        links::google_earth_link(&self.store.snapshot().form)
    }

    /// Submit from the final step. Success ends the session; failure keeps
    /// every answer for a retry.
    pub async fn submit(
        &self,
        gateway: &dyn AssessmentGateway,
    ) -> Result<SubmissionReceipt, SessionError> {
        let outcome = self.try_submit(gateway).await;
        match &outcome {
            Ok(receipt) => {
                self.close();
                self.notices.send(Notice::success(
                    "Assessment created",
                    format!("Reference {}", receipt.id),
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "submission failed");
                self.notices.send(Notice::from(e));
            }
        }
        outcome
    }

    async fn try_submit(
        &self,
        gateway: &dyn AssessmentGateway,
    ) -> Result<SubmissionReceipt, SessionError> {
        let form = self.store.submission_form().map_err(SubmissionError::from)?;
        let request = AssessmentRequest::from_form(&form);
        let created = gateway.create(&request).await?;
        tracing::info!(id = %created.id, "assessment created");
        Ok(SubmissionReceipt::new(
            created,
            request,
            self.results_url.as_ref(),
        ))
    }

    /// End the session without submitting.
    pub fn close(&self) {
        self.geocoder.shutdown();
        self.store.close();
    }
}

impl Drop for WizardSession {
    fn drop(&mut self) {
        self.close();
    }
}
