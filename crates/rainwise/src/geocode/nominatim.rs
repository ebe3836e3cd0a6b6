//! Nominatim-compatible search client.
//!
//! Any service answering `GET <endpoint>?q=<address>&format=json` with a JSON
//! array of `{lat, lon, display_name}` objects works. No API key.

use async_trait::async_trait;
use url::Url;

use super::{GeocodeCandidate, GeocodeError, GeocodeLookup};
use crate::http_client::HttpClient;

/// Public OpenStreetMap Nominatim search endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Geocoder backed by a Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: HttpClient,
    endpoint: Url,
    country_codes: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(client: HttpClient, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            country_codes: None,
        }
    }

    /// Restrict results to a comma-separated list of ISO country codes.
    pub fn with_country_codes(mut self, codes: Option<String>) -> Self {
        self.country_codes = codes.filter(|c| !c.trim().is_empty());
        self
    }

    /// Build the search URL for an address.
    pub fn search_url(&self, address: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("q", address)
                .append_pair("format", "json")
                .append_pair("limit", "1");
            if let Some(ref codes) = self.country_codes {
                query.append_pair("countrycodes", codes);
            }
        }
        url
    }
}

#[async_trait]
impl GeocodeLookup for NominatimGeocoder {
    async fn search(&self, address: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let url = self.search_url(address);
        let candidates: Vec<GeocodeCandidate> = self.client.get_json(url).await?;
        tracing::debug!(address, results = candidates.len(), "nominatim search");
        Ok(candidates)
    }
}
