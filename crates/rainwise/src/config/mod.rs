//! Configuration management for rainwise using the prefer crate.
//!
//! `Config` mirrors the file on disk: every field optional, sections
//! defaulted. `Settings` is the resolved, validated form the rest of the
//! crate runs on.

mod loader;
mod settings;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, CoordinateError};

pub use loader::{apply_env_overrides, load_settings_with_options, LoadOptions};
pub use settings::{GeolocationSetting, Settings};

/// Errors from reading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
    #[error("invalid URL for {key}: {value:?} ({reason})")]
    InvalidUrl {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("invalid coordinate for {key}: {source}")]
    InvalidCoordinate {
        key: &'static str,
        #[source]
        source: CoordinateError,
    },
    #[error("invalid geolocation setting: {0}")]
    InvalidGeolocation(String),
}

/// Address lookup settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Nominatim-compatible search endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Quiet window after the last keystroke, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Comma-separated ISO country codes to restrict results to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_codes: Option<String>,
    /// Offline gazetteer. When non-empty it replaces the remote service.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub places: BTreeMap<String, Coordinate>,
}

/// Assessment service settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Assessment-creation endpoint (POST).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Results page; receipts link to `<results_url>?id=<id>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_center: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fly_duration_ms: Option<u64>,
}

/// Which device geolocation provider to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationProvider {
    /// "Locate me" reports the capability as unavailable.
    #[default]
    None,
    Fixed,
    Ip,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default)]
    pub provider: GeolocationProvider,
    /// Position reported by the `fixed` provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<Coordinate>,
    /// Endpoint for the `ip` provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Discover a rainwise config file in the standard locations. A missing
    /// or unreadable file means defaults.
    pub async fn load() -> Self {
        match prefer::load("rainwise").await {
            Ok(found) => match found.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Ignoring config file: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path. The format follows the
    /// extension: TOML, YAML, or JSON for anything else.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;

        let mut config = Self::parse(&path, &contents)?;
        tracing::debug!("Loaded config from {}", path.display());
        config.source_path = Some(path);
        Ok(config)
    }

    /// Parse file contents, picking the format from `path`'s extension.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
