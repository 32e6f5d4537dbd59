//! Zoom/pan state of the map surface and the controller that owns it.
//!
//! The background is drawn with `transform-origin: top left`, so at zoom `z`
//! it covers `width * z` pixels starting at `pan.x`. Keeping
//! `pan.x ∈ [width·(1−z), 0]` means no empty space ever shows past its edges;
//! below or at 1× there is nothing to pan and pan is pinned to the origin.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::geometry::Point;

/// Zoom factor and pan offset (CSS pixels) applied to the map layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default, rename = "panOffset")]
    pub pan: Point,
}

fn default_zoom() -> f64 {
    1.0
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Point::zero() }
    }
}

impl Viewport {
    /// Whether this is the untransformed 1× view at the origin.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        (self.zoom - 1.0).abs() < f64::EPSILON && self.pan == Point::zero()
    }

    /// Repair a viewport read from storage.
    ///
    /// Non-positive or non-finite zoom falls back to 1, other zooms are clamped into
    /// range, and pan is pinned to the origin at or below 1×.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let zoom = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
        let pan = if zoom <= 1.0 || !self.pan.x.is_finite() || !self.pan.y.is_finite() {
            Point::zero()
        } else {
            self.pan
        };
        Self { zoom, pan }
    }
}

/// Clamp `pan` so a map of `width × height` at `zoom` never reveals empty space.
#[must_use]
pub fn clamp_pan(pan: Point, zoom: f64, width: f64, height: f64) -> Point {
    if zoom <= 1.0 || !zoom.is_finite() {
        return Point::zero();
    }
    let min_x = finite_extent(width) * (1.0 - zoom);
    let min_y = finite_extent(height) * (1.0 - zoom);
    Point {
        x: clamp_or_floor(pan.x, min_x),
        y: clamp_or_floor(pan.y, min_y),
    }
}

fn finite_extent(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn clamp_or_floor(v: f64, min: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(min, 0.0) }
}

/// Owns the viewport and enforces its bounds on every mutation.
#[derive(Debug, Clone)]
pub struct ViewportController {
    viewport: Viewport,
    map_width: f64,
    map_height: f64,
    step: f64,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ZOOM_STEP)
    }
}

impl ViewportController {
    /// Create a controller at the identity view using `step` for the zoom buttons.
    #[must_use]
    pub fn new(step: f64) -> Self {
        Self { viewport: Viewport::default(), map_width: 0.0, map_height: 0.0, step }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Replace the whole viewport, e.g. after loading from storage.
    pub fn replace(&mut self, viewport: Viewport) {
        self.viewport = viewport.sanitized();
    }

    /// Record the rendered map size; pan is re-clamped against it.
    ///
    /// Before the first size is known (0 × 0) pan is left alone so a restored
    /// view survives until layout.
    pub fn set_map_size(&mut self, width: f64, height: f64) {
        self.map_width = width;
        self.map_height = height;
        if width > 0.0 && height > 0.0 {
            self.viewport.pan = clamp_pan(self.viewport.pan, self.viewport.zoom, width, height);
        }
    }

    /// Apply a pan offset, clamped. Returns the pan actually applied.
    pub fn pan_to(&mut self, pan: Point) -> Point {
        self.viewport.pan = clamp_pan(pan, self.viewport.zoom, self.map_width, self.map_height);
        self.viewport.pan
    }

    /// Change zoom by `delta`, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    ///
    /// At or below 1× pan resets to the origin; above it pan is re-clamped
    /// for the new zoom. Returns whether the viewport changed.
    pub fn zoom_by(&mut self, delta: f64) -> bool {
        if !delta.is_finite() {
            return false;
        }
        let before = self.viewport;
        let zoom = (self.viewport.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        self.viewport.zoom = zoom;
        self.viewport.pan = if zoom <= 1.0 {
            Point::zero()
        } else {
            clamp_pan(self.viewport.pan, zoom, self.map_width, self.map_height)
        };
        self.viewport != before
    }

    /// Zoom in by one step. No-op at `MAX_ZOOM`.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.zoom_by(self.step)
    }

    /// Zoom out by one step. No-op at `MIN_ZOOM`.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.zoom_by(-self.step)
    }

    /// Return to 1× at the origin. Returns whether anything changed.
    pub fn reset_view(&mut self) -> bool {
        let before = self.viewport;
        self.viewport = Viewport::default();
        self.viewport != before
    }

    #[must_use]
    pub fn can_zoom_in(&self) -> bool {
        self.viewport.zoom < MAX_ZOOM
    }

    #[must_use]
    pub fn can_zoom_out(&self) -> bool {
        self.viewport.zoom > MIN_ZOOM
    }

    #[must_use]
    pub fn can_reset(&self) -> bool {
        !self.viewport.is_identity()
    }
}
