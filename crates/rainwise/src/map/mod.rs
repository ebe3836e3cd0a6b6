//! Map interaction surface.
//!
//! The surface turns gestures into coordinates and reports them upward; it
//! never writes the form itself. Its marker follows whatever coordinate the
//! wizard holds, flying there with an eased transition whenever that value
//! changes, whoever produced it.

mod tiles;
mod view;

use std::sync::Arc;
use std::time::Duration;

use crate::capability::Capability;
use crate::location::{DeviceGeolocation, LocationError, PositionOptions};
use crate::models::{Coordinate, CoordinateSource};

pub use tiles::{TileSource, ESRI_WORLD_IMAGERY_ATTRIBUTION, ESRI_WORLD_IMAGERY_URL};
pub use view::{
    ease_in_out, MapView, ViewTransition, FALLBACK_CENTER, FALLBACK_ZOOM, FLY_DURATION, FOCUS_ZOOM,
};

/// Whether the surface accepts gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    #[default]
    Interactive,
    /// Display only: no click, drag or locate.
    ReadOnly,
}

/// Errors from map gestures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("geolocation is not available: {0}")]
    UnsupportedCapability(String),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error("the map is read-only")]
    ReadOnly,
    #[error("there is no marker to drag")]
    NoMarker,
}

/// A coordinate picked on the map, tagged with the gesture that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPick {
    pub coordinate: Coordinate,
    pub source: CoordinateSource,
}

/// Surface settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub tiles: TileSource,
    pub fallback: MapView,
    pub focus_zoom: f64,
    pub fly_duration: Duration,
    pub position: PositionOptions,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            tiles: TileSource::default(),
            fallback: MapView::fallback(),
            focus_zoom: FOCUS_ZOOM,
            fly_duration: FLY_DURATION,
            position: PositionOptions::default(),
        }
    }
}

/// The interactive map.
pub struct MapSurface {
    mode: MapMode,
    options: MapOptions,
    geolocation: Capability<Arc<dyn DeviceGeolocation>>,
    view: MapView,
    marker: Option<Coordinate>,
}

impl MapSurface {
    pub fn new(
        mode: MapMode,
        geolocation: Capability<Arc<dyn DeviceGeolocation>>,
        options: MapOptions,
    ) -> Self {
        Self {
            mode,
            view: options.fallback,
            options,
            geolocation,
            marker: None,
        }
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == MapMode::Interactive
    }

    pub fn view(&self) -> MapView {
        self.view
    }

    pub fn marker(&self) -> Option<Coordinate> {
        self.marker
    }

    pub fn tiles(&self) -> &TileSource {
        &self.options.tiles
    }

    pub fn can_locate(&self) -> bool {
        self.is_interactive() && self.geolocation.is_available()
    }

    /// Ask the device for its position. A failure leaves the surface as it
    /// was.
    pub async fn locate(&self) -> Result<MapPick, MapError> {
        self.ensure_interactive()?;
        let provider = match self.geolocation.get() {
            Ok(provider) => Arc::clone(provider),
            Err(reason) => return Err(MapError::UnsupportedCapability(reason.to_string())),
        };

        let options = self.options.position;
        let position =
            match tokio::time::timeout(options.timeout, provider.current_position(options)).await {
                Ok(result) => result?,
                Err(_) => return Err(LocationError::timeout(options.timeout).into()),
            };

        tracing::debug!(
            lat = position.coordinate.lat,
            lng = position.coordinate.lng,
            accuracy = ?position.accuracy,
            "device location fix"
        );
        Ok(MapPick {
            coordinate: position.coordinate,
            source: CoordinateSource::DeviceLocation,
        })
    }

    /// Pick the clicked point.
    pub fn click(&self, coordinate: Coordinate) -> Result<MapPick, MapError> {
        self.ensure_interactive()?;
        Ok(MapPick {
            coordinate,
            source: CoordinateSource::MapClick,
        })
    }

    /// Report where the marker came to rest after a drag.
    pub fn drag_end(&self, resting: Coordinate) -> Result<MapPick, MapError> {
        self.ensure_interactive()?;
        if self.marker.is_none() {
            return Err(MapError::NoMarker);
        }
        Ok(MapPick {
            coordinate: resting,
            source: CoordinateSource::MarkerDrag,
        })
    }

    /// Follow the wizard's coordinate. Returns the transition to animate when
    /// the marker moved to a new point.
    pub fn sync_external(&mut self, coordinate: Option<Coordinate>) -> Option<ViewTransition> {
        if coordinate == self.marker {
            return None;
        }
        self.marker = coordinate;
        match coordinate {
            Some(target) => {
                let transition = ViewTransition::fly_to(
                    self.view,
                    target,
                    self.options.focus_zoom,
                    self.options.fly_duration,
                );
                self.view = transition.to;
                Some(transition)
            }
            None => {
                self.view = self.options.fallback;
                None
            }
        }
    }

    fn ensure_interactive(&self) -> Result<(), MapError> {
        match self.mode {
            MapMode::Interactive => Ok(()),
            MapMode::ReadOnly => Err(MapError::ReadOnly),
        }
    }
}

impl std::fmt::Debug for MapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSurface")
            .field("mode", &self.mode)
            .field("view", &self.view)
            .field("marker", &self.marker)
            .field("geolocation", &self.geolocation.is_available())
            .finish()
    }
}
