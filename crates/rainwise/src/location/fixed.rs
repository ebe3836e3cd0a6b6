//! Fixed position provider, for hosts that know where they are.

use async_trait::async_trait;

use super::{DeviceGeolocation, LocationError, Position, PositionOptions};
use crate::models::Coordinate;

/// Always reports the same coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition {
    coordinate: Coordinate,
}

impl FixedPosition {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl DeviceGeolocation for FixedPosition {
    async fn current_position(&self, _options: PositionOptions) -> Result<Position, LocationError> {
        Ok(Position {
            coordinate: self.coordinate,
            accuracy: Some(0.0),
        })
    }
}
