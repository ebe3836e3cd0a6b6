//! CoordinateSource resolver.
//!
//! Every producer of a coordinate (device location, map click, marker drag,
//! geocoding) hands its value to the resolver, which writes it into the form
//! through the wizard store. Last writer wins. The one exception is a geocode
//! result when any coordinate was written after its lookup was issued: the
//! user acted in the meantime, so the gesture stands. Ordering uses the
//! store's coordinate revision, never timestamps.

use crate::models::{Coordinate, CoordinateSource, ResolvedCoordinate};
use crate::wizard::{WizardError, WizardStore};

/// What happened to a coordinate offered to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// Stored as the form's coordinate.
    Applied,
    /// Dropped because a newer coordinate is already stored.
    Stale,
}

/// Writes coordinates into the wizard form.
#[derive(Debug, Clone)]
pub struct CoordinateResolver {
    store: WizardStore,
}

impl CoordinateResolver {
    pub fn new(store: WizardStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &WizardStore {
        &self.store
    }

    /// Current coordinate with provenance.
    pub fn current(&self) -> Option<ResolvedCoordinate> {
        self.store.snapshot().form.coordinate
    }

    /// Revision to capture when issuing a lookup; pass it back to
    /// [`accept_issued`](Self::accept_issued).
    pub fn revision(&self) -> u64 {
        self.store.coordinate_revision()
    }

    /// Accept a coordinate unconditionally.
    pub fn accept(
        &self,
        coordinate: Coordinate,
        source: CoordinateSource,
    ) -> Result<AcceptOutcome, WizardError> {
        self.write(coordinate, source, None)
    }

    /// Accept the result of a lookup issued at `issued_revision`. User
    /// gestures ignore the revision and always apply.
    pub fn accept_issued(
        &self,
        coordinate: Coordinate,
        source: CoordinateSource,
        issued_revision: u64,
    ) -> Result<AcceptOutcome, WizardError> {
        let guard = (!source.is_user_gesture()).then_some(issued_revision);
        self.write(coordinate, source, guard)
    }

    fn write(
        &self,
        coordinate: Coordinate,
        source: CoordinateSource,
        guard: Option<u64>,
    ) -> Result<AcceptOutcome, WizardError> {
        let incoming = ResolvedCoordinate::now(coordinate, source);
        let outcome = if self.store.write_coordinate(incoming, guard)? {
            AcceptOutcome::Applied
        } else {
            AcceptOutcome::Stale
        };

        match outcome {
            AcceptOutcome::Applied => tracing::info!(
                source = source.as_str(),
                lat = coordinate.lat,
                lng = coordinate.lng,
                "coordinate updated"
            ),
            AcceptOutcome::Stale => tracing::debug!(
                source = source.as_str(),
                "dropping coordinate superseded by a newer write"
            ),
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_last_writer_wins() {
        let resolver = CoordinateResolver::new(WizardStore::new());
        resolver
            .accept(point(19.0760, 72.8777), CoordinateSource::MapClick)
            .unwrap();
        resolver
            .accept(point(19.0800, 72.8800), CoordinateSource::MarkerDrag)
            .unwrap();
        let current = resolver.current().unwrap();
        assert_eq!(current.coordinate, point(19.0800, 72.8800));
        assert_eq!(current.source, CoordinateSource::MarkerDrag);
    }

    #[test]
    fn test_geocode_issued_before_gesture_is_stale() {
        let resolver = CoordinateResolver::new(WizardStore::new());
        let issued = resolver.revision();
        resolver
            .accept(point(19.0760, 72.8777), CoordinateSource::MapClick)
            .unwrap();

        let outcome = resolver
            .accept_issued(point(12.9716, 77.5946), CoordinateSource::Geocode, issued)
            .unwrap();
        assert_eq!(outcome, AcceptOutcome::Stale);
        assert_eq!(resolver.current().unwrap().coordinate, point(19.0760, 72.8777));
    }

    #[test]
    fn test_gesture_wins_even_with_identical_timestamps() {
        // the clock plays no part in ordering
        let store = WizardStore::new();
        let resolver = CoordinateResolver::new(store.clone());
        let issued = resolver.revision();
        let stamp = chrono::Utc::now();
        store
            .write_coordinate(
                ResolvedCoordinate::at(point(1.0, 1.0), CoordinateSource::MapClick, stamp),
                None,
            )
            .unwrap();
        let outcome = resolver
            .accept_issued(point(2.0, 2.0), CoordinateSource::Geocode, issued)
            .unwrap();
        assert_eq!(outcome, AcceptOutcome::Stale);
        assert_eq!(resolver.current().unwrap().coordinate, point(1.0, 1.0));
    }

    #[test]
    fn test_geocode_applies_when_nothing_intervened() {
        let resolver = CoordinateResolver::new(WizardStore::new());
        resolver
            .accept(point(1.0, 1.0), CoordinateSource::MapClick)
            .unwrap();
        let issued = resolver.revision();
        let outcome = resolver
            .accept_issued(point(2.0, 2.0), CoordinateSource::Geocode, issued)
            .unwrap();
        assert_eq!(outcome, AcceptOutcome::Applied);
    }

    #[test]
    fn test_gestures_never_stale() {
        let resolver = CoordinateResolver::new(WizardStore::new());
        let issued = resolver.revision();
        resolver
            .accept(point(1.0, 1.0), CoordinateSource::Geocode)
            .unwrap();
        let outcome = resolver
            .accept_issued(point(2.0, 2.0), CoordinateSource::DeviceLocation, issued)
            .unwrap();
        assert_eq!(outcome, AcceptOutcome::Applied);
        assert_eq!(resolver.current().unwrap().coordinate, point(2.0, 2.0));
    }

    #[test]
    fn test_updates_completion() {
        let store = WizardStore::new();
        let resolver = CoordinateResolver::new(store.clone());
        resolver
            .accept(point(1.0, 1.0), CoordinateSource::MapClick)
            .unwrap();
        assert_eq!(store.completion(), 20.0);
    }

    #[test]
    fn test_closed_session_rejects() {
        let store = WizardStore::new();
        let resolver = CoordinateResolver::new(store.clone());
        store.close();
        assert_eq!(
            resolver.accept(point(1.0, 1.0), CoordinateSource::MapClick),
            Err(WizardError::SessionClosed)
        );
    }
}
