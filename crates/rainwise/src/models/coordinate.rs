//! Geographic coordinate and its provenance.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors from building a coordinate out of untrusted input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("expected \"lat, lng\", got {0:?}")]
    Format(String),
}

/// A validated WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Parse the string pair returned by geocoding services.
    pub fn parse(lat: &str, lng: &str) -> Result<Self, CoordinateError> {
        let lat_value: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordinateError::NotANumber(lat.to_string()))?;
        let lng_value: f64 = lng
            .trim()
            .parse()
            .map_err(|_| CoordinateError::NotANumber(lng.to_string()))?;
        Self::new(lat_value, lng_value)
    }

    /// Parse user input of the form `"lat, lng"` or `"lat lng"`.
    pub fn parse_pair(input: &str) -> Result<Self, CoordinateError> {
        let mut parts = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        match (parts.next(), parts.next(), parts.next()) {
            (Some(lat), Some(lng), None) => Self::parse(lat, lng),
            _ => Err(CoordinateError::Format(input.to_string())),
        }
    }

    /// Linear interpolation towards `other`, `t` in [0, 1].
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        let t = t.clamp(0.0, 1.0);
        Coordinate {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Which producer wrote a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSource {
    DeviceLocation,
    MapClick,
    MarkerDrag,
    Geocode,
}

impl CoordinateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeviceLocation => "device_location",
            Self::MapClick => "map_click",
            Self::MarkerDrag => "marker_drag",
            Self::Geocode => "geocode",
        }
    }

    /// Gestures are synchronous with the user action that produced them.
    pub fn is_user_gesture(&self) -> bool {
        !matches!(self, Self::Geocode)
    }
}

/// A coordinate stamped with its producer and production time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCoordinate {
    pub coordinate: Coordinate,
    pub source: CoordinateSource,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedCoordinate {
    pub fn now(coordinate: Coordinate, source: CoordinateSource) -> Self {
        Self::at(coordinate, source, Utc::now())
    }

    pub fn at(coordinate: Coordinate, source: CoordinateSource, at: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            source,
            resolved_at: at,
        }
    }
}
