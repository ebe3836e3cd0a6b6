//! Fixed-table geocoder.
//!
//! Resolves addresses from a table supplied up front (config `places` or
//! test fixtures). Keys match case-insensitively on the trimmed address.
//! Unknown addresses return an empty candidate list.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{GeocodeCandidate, GeocodeError, GeocodeLookup};
use crate::models::Coordinate;

/// In-memory lookup table.
#[derive(Debug, Default)]
pub struct StaticLookup {
    places: HashMap<String, Vec<GeocodeCandidate>>,
    latency: Duration,
    queries: Mutex<Vec<String>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a place with a valid coordinate.
    pub fn with_place(self, name: &str, coordinate: Coordinate) -> Self {
        let candidate = GeocodeCandidate {
            lat: coordinate.lat.to_string(),
            lon: coordinate.lng.to_string(),
            display_name: Some(name.to_string()),
        };
        self.with_candidates(name, vec![candidate])
    }

    /// Add raw candidates, which may be malformed.
    pub fn with_candidates(mut self, name: &str, candidates: Vec<GeocodeCandidate>) -> Self {
        self.places.insert(normalize(name), candidates);
        self
    }

    /// Delay every answer, as a remote service would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Addresses looked up so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait]
impl GeocodeLookup for StaticLookup {
    async fn search(&self, address: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(address.to_string());
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self
            .places
            .get(&normalize(address))
            .cloned()
            .unwrap_or_default())
    }
}
