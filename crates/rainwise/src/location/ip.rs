//! IP-based position lookup.
//!
//! Terminals have no GPS, so "locate me" falls back to an ip-api.com style
//! service: `GET <endpoint>` answers `{"status": "success", "lat", "lon"}` or
//! `{"status": "fail", "message"}`. The fix is coarse (city level) and is
//! never cached.

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{DeviceGeolocation, LocationError, Position, PositionOptions};
use crate::http_client::{HttpClient, HttpError};
use crate::models::Coordinate;

/// Free ip-api.com endpoint. No API key.
pub const DEFAULT_IP_LOCATION_URL: &str = "http://ip-api.com/json";

/// Rough city-level accuracy reported for IP fixes, in metres.
const IP_ACCURACY_M: f64 = 25_000.0;

#[derive(Debug, Deserialize)]
struct IpLocationReply {
    status: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl IpLocationReply {
    fn into_position(self) -> Result<Position, LocationError> {
        if self.status != "success" {
            let message = self.message.unwrap_or_else(|| self.status.clone());
            return Err(LocationError::unavailable(message));
        }
        let (lat, lon) = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(LocationError::unavailable("reply carried no coordinate")),
        };
        let coordinate =
            Coordinate::new(lat, lon).map_err(|e| LocationError::unavailable(e.to_string()))?;
        Ok(Position {
            coordinate,
            accuracy: Some(IP_ACCURACY_M),
        })
    }
}

/// Position provider backed by an IP geolocation service.
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    client: HttpClient,
    endpoint: Url,
}

impl IpGeolocation {
    pub fn new(client: HttpClient, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl DeviceGeolocation for IpGeolocation {
    async fn current_position(&self, options: PositionOptions) -> Result<Position, LocationError> {
        let request = self.client.get_json::<IpLocationReply>(self.endpoint.clone());
        let reply = match tokio::time::timeout(options.timeout, request).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(HttpError::Status { status: 403, body })) => {
                return Err(LocationError::permission_denied(body))
            }
            Ok(Err(e)) => return Err(LocationError::unavailable(e.to_string())),
            Err(_) => return Err(LocationError::timeout(options.timeout)),
        };
        let position = reply.into_position()?;
        tracing::debug!(
            lat = position.coordinate.lat,
            lng = position.coordinate.lng,
            "ip location fix"
        );
        Ok(position)
    }
}
