//! Device geolocation.
//!
//! A one-shot position request in the shape of the browser geolocation API:
//! options in, either a position or a coded failure out. Providers are
//! injected through [`crate::Capability`], so a host without positioning
//! simply reports the capability as unavailable.

mod fixed;
mod ip;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::models::Coordinate;

pub use fixed::FixedPosition;
pub use ip::{IpGeolocation, DEFAULT_IP_LOCATION_URL};

/// Options for a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the provider may return. Zero forces a fresh fix.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

impl PositionOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinate: Coordinate,
    /// Accuracy radius in metres, when the provider knows it.
    pub accuracy: Option<f64>,
}

impl Position {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy: None,
        }
    }
}

/// Why a position request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationErrorReason {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl LocationErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission denied",
            Self::PositionUnavailable => "position unavailable",
            Self::Timeout => "timed out",
        }
    }
}

impl fmt::Display for LocationErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed position request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("location {reason}: {message}")]
pub struct LocationError {
    pub reason: LocationErrorReason,
    pub message: String,
}

impl LocationError {
    pub fn new(reason: LocationErrorReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(LocationErrorReason::PermissionDenied, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(LocationErrorReason::PositionUnavailable, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            LocationErrorReason::Timeout,
            format!("no fix within {} ms", after.as_millis()),
        )
    }
}

/// A source of device position fixes.
#[async_trait]
pub trait DeviceGeolocation: Send + Sync {
    /// Request one position fix.
    async fn current_position(&self, options: PositionOptions) -> Result<Position, LocationError>;
}
