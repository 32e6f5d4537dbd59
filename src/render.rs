//! Scene model: a renderer-agnostic description of the map surface.
//!
//! [`build_scene`] turns read-only views of the registry, the visible layout
//! and the viewport into plain values. The browser host copies them into DOM
//! nodes; tests assert on them directly. Nothing here mutates engine state.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use serde::Serialize;

use crate::background::MapImage;
use crate::layout::Layout;
use crate::sensor::{SensorId, SensorRegistry};
use crate::viewport::{Viewport, ViewportController};

/// Placeholder drawn when no background has been uploaded.
pub const EMPTY_BACKGROUND_CSS: &str = "radial-gradient(circle, #1e293b 0%, #0f172a 100%)";

/// One indicator ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorView {
    pub sensor_id: SensorId,
    pub name: String,
    pub value: String,
    /// `status-ok`, `status-alert` or `status-danger`.
    pub status_class: &'static str,
    /// Center, in percent of the map layer.
    pub left_pct: f64,
    pub top_pct: f64,
    pub scale: f64,
    /// Being dragged or resized right now.
    pub active: bool,
    /// Remove button and resize handle are shown.
    pub show_controls: bool,
}

/// Zoom button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomControls {
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
    pub can_reset: bool,
}

/// Everything the map surface shows at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// CSS `background-image` for the map layer.
    pub background_css: String,
    /// CSS `transform` for the map layer (`transform-origin: top left`).
    pub layer_transform: String,
    pub indicators: Vec<IndicatorView>,
    pub cursor: &'static str,
    pub editing: bool,
    pub placing: Option<SensorId>,
    /// Prompt shown over an empty, idle map.
    pub show_empty_hint: bool,
    pub zoom: ZoomControls,
    /// Latest user notice, if one is still showing.
    pub notice: Option<String>,
}

/// Inputs for [`build_scene`], borrowed from the surface.
#[derive(Debug, Clone, Copy)]
pub struct SceneSource<'a> {
    pub sensors: &'a SensorRegistry,
    pub layout: &'a Layout,
    pub viewport: &'a ViewportController,
    pub map_image: Option<&'a MapImage>,
    pub editing: bool,
    pub placing: Option<&'a str>,
    pub active_id: Option<&'a str>,
    pub cursor: &'static str,
    pub notice: Option<&'a str>,
}

/// CSS transform for the map layer at `viewport`.
#[must_use]
pub fn transform_css(viewport: &Viewport) -> String {
    format!("translate({}px, {}px) scale({})", viewport.pan.x, viewport.pan.y, viewport.zoom)
}

/// Build the scene. Orphaned placements are skipped, never removed.
#[must_use]
pub fn build_scene(src: &SceneSource<'_>) -> Scene {
    let indicators = src
        .layout
        .iter()
        .filter_map(|placement| {
            let sensor = src.sensors.get(&placement.sensor_id)?;
            Some(IndicatorView {
                sensor_id: sensor.id.clone(),
                name: sensor.name.clone(),
                value: sensor.value.clone(),
                status_class: sensor.status.css_class(),
                left_pct: placement.position.x,
                top_pct: placement.position.y,
                scale: placement.scale,
                active: src.active_id == Some(placement.sensor_id.as_str()),
                show_controls: src.editing,
            })
        })
        .collect();

    Scene {
        background_css: src.map_image.map_or_else(|| EMPTY_BACKGROUND_CSS.to_owned(), MapImage::css_url),
        layer_transform: transform_css(&src.viewport.viewport()),
        indicators,
        cursor: src.cursor,
        editing: src.editing,
        placing: src.placing.map(str::to_owned),
        show_empty_hint: src.map_image.is_none() && src.placing.is_none() && !src.editing,
        zoom: ZoomControls {
            can_zoom_in: src.viewport.can_zoom_in(),
            can_zoom_out: src.viewport.can_zoom_out(),
            can_reset: src.viewport.can_reset(),
        },
        notice: src.notice.map(str::to_owned),
    }
}
