//! Address geocoding.
//!
//! `GeocodeLookup` is the outbound boundary: address in, ordered candidate
//! list out. `DebouncedGeocoder` drives it from address edits and feeds the
//! first usable candidate to the coordinate resolver.

mod debounce;
mod nominatim;
mod table;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http_client::HttpError;
use crate::models::{Coordinate, CoordinateError};

pub use debounce::{DebouncedGeocoder, GeocodeStatus, DEFAULT_QUIET_WINDOW};
pub use nominatim::{NominatimGeocoder, DEFAULT_NOMINATIM_URL};
pub use table::StaticLookup;

/// One candidate returned by a geocoding service. Coordinates arrive as
/// strings and are only validated when used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub lat: String,
    pub lon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl GeocodeCandidate {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
            display_name: None,
        }
    }

    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        Coordinate::parse(&self.lat, &self.lon)
    }
}

/// Errors from a geocoding lookup.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("no results for address")]
    NoResults,
    #[error("malformed coordinate in result: {0}")]
    Malformed(#[from] CoordinateError),
}

impl GeocodeError {
    /// The lookup completed but produced nothing usable. Misses are logged
    /// and never shown to the user.
    pub fn is_miss(&self) -> bool {
        matches!(self, GeocodeError::NoResults | GeocodeError::Malformed(_))
    }
}

/// An address lookup service.
#[async_trait]
pub trait GeocodeLookup: Send + Sync {
    /// Look up `address` and return candidates, best first.
    async fn search(&self, address: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError>;
}

/// Take the first candidate. Later candidates are never consulted, even when
/// the first is malformed.
pub fn first_coordinate(candidates: &[GeocodeCandidate]) -> Result<Coordinate, GeocodeError> {
    let first = candidates.first().ok_or(GeocodeError::NoResults)?;
    Ok(first.coordinate()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_coordinate_uses_first_candidate() {
        let candidates = vec![
            GeocodeCandidate::new("12.9716", "77.5946"),
            GeocodeCandidate::new("0", "0"),
        ];
        assert_eq!(
            first_coordinate(&candidates).unwrap(),
            Coordinate::new(12.9716, 77.5946).unwrap()
        );
    }

    #[test]
    fn test_empty_and_malformed_are_misses() {
        let err = first_coordinate(&[]).unwrap_err();
        assert!(err.is_miss());

        let err = first_coordinate(&[GeocodeCandidate::new("north", "77.5")]).unwrap_err();
        assert!(matches!(err, GeocodeError::Malformed(_)));
        assert!(err.is_miss());

        let err = first_coordinate(&[GeocodeCandidate::new("95.0", "77.5")]).unwrap_err();
        assert!(err.is_miss());
    }

    #[test]
    fn test_http_error_is_not_a_miss() {
        let err = GeocodeError::from(HttpError::Status {
            status: 503,
            body: "busy".into(),
        });
        assert!(!err.is_miss());
    }
}
