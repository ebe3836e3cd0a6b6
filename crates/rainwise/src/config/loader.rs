//! Configuration loading and environment overrides.

use std::path::PathBuf;

use crate::models::Coordinate;

use super::{Config, ConfigError, GeolocationProvider, Settings};

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Apply `RAINWISE_*` overrides. `lookup` reads one variable; blank values
/// are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = var("RAINWISE_GEOCODER_URL") {
        tracing::debug!("Using RAINWISE_GEOCODER_URL from environment: {}", url);
        config.geocoder.endpoint = Some(url);
    }
    if let Some(url) = var("RAINWISE_ASSESSMENT_URL") {
        tracing::debug!("Using RAINWISE_ASSESSMENT_URL from environment: {}", url);
        config.assessment.endpoint = Some(url);
    }
    if let Some(url) = var("RAINWISE_RESULTS_URL") {
        config.assessment.results_url = Some(url);
    }
    if let Some(provider) = var("RAINWISE_GEOLOCATION") {
        let geolocation = &mut config.geolocation;
        match provider.trim().to_ascii_lowercase().as_str() {
            "none" => geolocation.provider = GeolocationProvider::None,
            "ip" => geolocation.provider = GeolocationProvider::Ip,
            pair => {
                let fixed = Coordinate::parse_pair(pair).map_err(|e| {
                    ConfigError::InvalidGeolocation(format!("RAINWISE_GEOLOCATION: {}", e))
                })?;
                geolocation.provider = GeolocationProvider::Fixed;
                geolocation.fixed = Some(fixed);
            }
        }
    }
    Ok(())
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple; the config carries the env overrides.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    // Priority 1: explicit --config flag. Priority 2: discovery via prefer.
    let mut config = match options.config_path {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    let settings = Settings::from_config(&config)?;
    Ok((settings, config))
}
