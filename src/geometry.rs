//! Coordinate conversions between screen pixels and map percentages.
//!
//! Placements are stored as percentages of the untransformed map so they stay
//! valid at any zoom/pan. Every "where on the map did the user point" question
//! goes through [`screen_to_percent`]; relative motion goes through
//! [`screen_delta_to_percent`]. Nothing here clamps or rounds.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// A point in screen pixels, map pixels, or map percent, depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin, `(0, 0)`.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Component-wise `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }

    /// Component-wise `self + other`.
    #[must_use]
    pub fn offset_by(self, other: Point) -> Point {
        Point { x: self.x + other.x, y: self.y + other.y }
    }

    /// Clamp both axes into `[0, max]`.
    #[must_use]
    pub fn clamp_each(self, max: f64) -> Point {
        Point { x: self.x.clamp(0.0, max), y: self.y.clamp(0.0, max) }
    }
}

/// Bounding rectangle of the map container in screen pixels.
///
/// Mirrors the browser's `getBoundingClientRect()` for the container element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl MapRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// A rect with no usable area; percent conversions would divide by zero.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Convert a screen point to a percent position on the untransformed map.
#[must_use]
pub fn screen_to_percent(screen: Point, rect: &MapRect, viewport: &Viewport) -> Point {
    let map_x = (screen.x - rect.left - viewport.pan.x) / viewport.zoom;
    let map_y = (screen.y - rect.top - viewport.pan.y) / viewport.zoom;
    Point {
        x: map_x / rect.width * 100.0,
        y: map_y / rect.height * 100.0,
    }
}

/// Convert a percent position on the map to the screen point where it is drawn.
#[must_use]
pub fn percent_to_screen(percent: Point, rect: &MapRect, viewport: &Viewport) -> Point {
    let map_x = percent.x / 100.0 * rect.width;
    let map_y = percent.y / 100.0 * rect.height;
    Point {
        x: map_x * viewport.zoom + viewport.pan.x + rect.left,
        y: map_y * viewport.zoom + viewport.pan.y + rect.top,
    }
}

/// Convert a screen-pixel displacement to a percent-of-map displacement at `zoom`.
#[must_use]
pub fn screen_delta_to_percent(delta: Point, rect: &MapRect, zoom: f64) -> Point {
    Point {
        x: delta.x / zoom / rect.width * 100.0,
        y: delta.y / zoom / rect.height * 100.0,
    }
}
