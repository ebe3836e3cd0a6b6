//! Resolved runtime settings and the service builders that use them.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::{Config, ConfigError, GeolocationProvider};
use crate::capability::Capability;
use crate::geocode::{GeocodeLookup, NominatimGeocoder, StaticLookup, DEFAULT_NOMINATIM_URL};
use crate::http_client::{resolve_user_agent, HttpClient, HttpError};
use crate::location::{DeviceGeolocation, FixedPosition, IpGeolocation, DEFAULT_IP_LOCATION_URL};
use crate::map::{MapOptions, MapView, TileSource};
use crate::models::Coordinate;
use crate::session::SessionOptions;
use crate::submission::HttpAssessmentGateway;

/// Default request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Resolved device geolocation provider.
#[derive(Debug, Clone, PartialEq)]
pub enum GeolocationSetting {
    None,
    Fixed(Coordinate),
    Ip(Url),
}

/// Application settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// User agent for HTTP requests.
    pub user_agent: String,
    pub request_timeout: Duration,
    pub geocoder_endpoint: Url,
    pub quiet_window: Duration,
    pub country_codes: Option<String>,
    /// Offline gazetteer entries, if any.
    pub places: Vec<(String, Coordinate)>,
    pub assessment_endpoint: Option<Url>,
    pub results_url: Option<Url>,
    pub map: MapOptions,
    pub geolocation: GeolocationSetting,
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_optional_url(key: &'static str, value: Option<&str>) -> Result<Option<Url>, ConfigError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_url(key, value).map(Some),
    }
}

fn checked(key: &'static str, coordinate: Coordinate) -> Result<Coordinate, ConfigError> {
    Coordinate::new(coordinate.lat, coordinate.lng)
        .map_err(|source| ConfigError::InvalidCoordinate { key, source })
}

impl Settings {
    /// Resolve and validate a config.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let geocoder = &config.geocoder;
        let geocoder_endpoint = parse_url(
            "geocoder.endpoint",
            geocoder.endpoint.as_deref().unwrap_or(DEFAULT_NOMINATIM_URL),
        )?;
        let places = geocoder
            .places
            .iter()
            .map(|(name, coordinate)| {
                checked("geocoder.places", *coordinate).map(|c| (name.clone(), c))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let map = &config.map;
        let defaults = MapOptions::default();
        let fallback_center = match map.fallback_center {
            Some(center) => checked("map.fallback_center", center)?,
            None => defaults.fallback.center,
        };
        let geolocation_timeout = config
            .geolocation
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.position.timeout);

        let map_options = MapOptions {
            tiles: TileSource::new(
                map.tile_url.clone().unwrap_or(defaults.tiles.url_template),
                map.attribution.clone().unwrap_or(defaults.tiles.attribution),
            ),
            fallback: MapView::new(
                fallback_center,
                map.fallback_zoom.unwrap_or(defaults.fallback.zoom),
            ),
            focus_zoom: map.focus_zoom.unwrap_or(defaults.focus_zoom),
            fly_duration: map
                .fly_duration_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.fly_duration),
            position: defaults.position.with_timeout(geolocation_timeout),
        };

        let geolocation = match config.geolocation.provider {
            GeolocationProvider::None => GeolocationSetting::None,
            GeolocationProvider::Fixed => match config.geolocation.fixed {
                Some(fixed) => GeolocationSetting::Fixed(checked("geolocation.fixed", fixed)?),
                None => {
                    return Err(ConfigError::InvalidGeolocation(
                        "provider \"fixed\" needs geolocation.fixed {lat, lng}".to_string(),
                    ))
                }
            },
            GeolocationProvider::Ip => GeolocationSetting::Ip(parse_url(
                "geolocation.endpoint",
                config
                    .geolocation
                    .endpoint
                    .as_deref()
                    .unwrap_or(DEFAULT_IP_LOCATION_URL),
            )?),
        };

        Ok(Self {
            user_agent: resolve_user_agent(geocoder.user_agent.as_deref()),
            request_timeout: Duration::from_secs(
                config.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            ),
            geocoder_endpoint,
            quiet_window: geocoder
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(crate::geocode::DEFAULT_QUIET_WINDOW),
            country_codes: geocoder.country_codes.clone(),
            places,
            assessment_endpoint: parse_optional_url(
                "assessment.endpoint",
                config.assessment.endpoint.as_deref(),
            )?,
            results_url: parse_optional_url(
                "assessment.results_url",
                config.assessment.results_url.as_deref(),
            )?,
            map: map_options,
            geolocation,
        })
    }

    /// Shared HTTP client for every outbound service.
    pub fn http_client(&self) -> Result<HttpClient, HttpError> {
        HttpClient::builder(self.request_timeout)
            .user_agent(&self.user_agent)
            .build()
    }

    /// Address lookup: the offline gazetteer when configured, otherwise the
    /// remote search endpoint.
    pub fn geocode_lookup(&self, client: &HttpClient) -> Arc<dyn GeocodeLookup> {
        if !self.places.is_empty() {
            let table = self
                .places
                .iter()
                .fold(StaticLookup::new(), |table, (name, coordinate)| {
                    table.with_place(name, *coordinate)
                });
            return Arc::new(table);
        }
        Arc::new(
            NominatimGeocoder::new(client.clone(), self.geocoder_endpoint.clone())
                .with_country_codes(self.country_codes.clone()),
        )
    }

    /// Device geolocation capability.
    pub fn geolocation(&self, client: &HttpClient) -> Capability<Arc<dyn DeviceGeolocation>> {
        match &self.geolocation {
            GeolocationSetting::None => {
                Capability::unavailable("no geolocation provider configured")
            }
            GeolocationSetting::Fixed(coordinate) => {
                Capability::Available(Arc::new(FixedPosition::new(*coordinate)))
            }
            GeolocationSetting::Ip(endpoint) => Capability::Available(Arc::new(
                IpGeolocation::new(client.clone(), endpoint.clone()),
            )),
        }
    }

    /// Assessment gateway, when an endpoint is configured.
    pub fn assessment_gateway(&self, client: &HttpClient) -> Option<HttpAssessmentGateway> {
        self.assessment_endpoint
            .as_ref()
            .map(|endpoint| HttpAssessmentGateway::new(client.clone(), endpoint.clone()))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            quiet_window: self.quiet_window,
            results_url: self.results_url.clone(),
        }
    }
}
