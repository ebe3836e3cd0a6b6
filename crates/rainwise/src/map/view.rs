//! Map viewport and eased transitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Coordinate;

/// Zoom level a fly-to settles on unless the view is already deeper.
pub const FOCUS_ZOOM: f64 = 16.0;

/// Length of a fly-to animation.
pub const FLY_DURATION: Duration = Duration::from_millis(1200);

/// Center of India, zoomed out far enough to show the country.
pub const FALLBACK_CENTER: Coordinate = Coordinate {
    lat: 20.5937,
    lng: 78.9629,
};

pub const FALLBACK_ZOOM: f64 = 5.0;

/// What the map is showing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: f64,
}

impl MapView {
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// The view shown before any coordinate exists.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_CENTER, FALLBACK_ZOOM)
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Cubic ease-in-out over `t` in [0, 1].
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// An eased move from one view to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransition {
    pub from: MapView,
    pub to: MapView,
    pub duration: Duration,
}

impl ViewTransition {
    /// Fly to `target`, keeping the current zoom if it is deeper than
    /// `focus_zoom`.
    pub fn fly_to(from: MapView, target: Coordinate, focus_zoom: f64, duration: Duration) -> Self {
        Self {
            from,
            to: MapView::new(target, from.zoom.max(focus_zoom)),
            duration,
        }
    }

    /// View at `elapsed` into the transition.
    pub fn sample(&self, elapsed: Duration) -> MapView {
        if self.is_finished(elapsed) {
            return self.to;
        }
        let t = ease_in_out(elapsed.as_secs_f64() / self.duration.as_secs_f64());
        MapView {
            center: self.from.center.lerp(&self.to.center, t),
            zoom: self.from.zoom + (self.to.zoom - self.from.zoom) * t,
        }
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}
