//! Placement layout: where each sensor's indicator sits on the map, and the
//! draft/commit editor that guards it.
//!
//! The committed [`Layout`] is what the dashboard shows and persists. Entering
//! edit mode clones it into a draft; every add/move/resize/remove during the
//! session touches only the draft. [`LayoutEditor::commit`] swaps the draft in
//! wholesale, [`LayoutEditor::discard`] drops it. Placements are plain values,
//! so the clone is fully isolated from the committed copy.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_SCALE, MAX_PERCENT, MAX_SCALE, MIN_SCALE};
use crate::geometry::Point;
use crate::sensor::SensorId;

/// A sensor indicator placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// The sensor this indicator shows.
    pub sensor_id: SensorId,
    /// Center of the indicator, in percent of map width/height.
    pub position: Point,
    /// Indicator size multiplier. Saved layouts predating resizing omit it.
    #[serde(default = "default_scale", deserialize_with = "scale_or_default")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    DEFAULT_SCALE
}

fn scale_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|s| s.is_finite() && *s > 0.0).unwrap_or(DEFAULT_SCALE))
}

impl Placement {
    /// A new placement at `position` (clamped to the map) with the default scale.
    #[must_use]
    pub fn new(sensor_id: impl Into<SensorId>, position: Point) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            position: position.clamp_each(MAX_PERCENT),
            scale: DEFAULT_SCALE,
        }
    }

    /// Bring position and scale back into their valid ranges.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        self.position = Point::new(finite_or(self.position.x, 0.0), finite_or(self.position.y, 0.0))
            .clamp_each(MAX_PERCENT);
        self.scale = finite_or(self.scale, DEFAULT_SCALE).clamp(MIN_SCALE, MAX_SCALE);
        self
    }
}

/// Ordered sequence of placements, at most one per sensor.
///
/// Deserializes through [`Layout::from_placements`], so a stored array with
/// duplicates or out-of-range values loads already sanitized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Placement>", into = "Vec<Placement>")]
pub struct Layout {
    placements: Vec<Placement>,
}

impl From<Vec<Placement>> for Layout {
    fn from(placements: Vec<Placement>) -> Self {
        Self::from_placements(placements)
    }
}

impl From<Layout> for Vec<Placement> {
    fn from(layout: Layout) -> Self {
        layout.placements
    }
}

impl Layout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layout from stored placements, keeping the first entry per sensor.
    #[must_use]
    pub fn from_placements(placements: Vec<Placement>) -> Self {
        let mut layout = Self::new();
        for placement in placements {
            layout.insert(placement);
        }
        layout
    }

    /// Append `placement`, sanitized, unless its sensor is already placed.
    /// Returns whether it was added.
    pub fn insert(&mut self, placement: Placement) -> bool {
        if self.contains(&placement.sensor_id) {
            return false;
        }
        self.placements.push(placement.sanitized());
        true
    }

    /// Remove a sensor's placement, returning it if present.
    pub fn remove(&mut self, sensor_id: &str) -> Option<Placement> {
        let idx = self.placements.iter().position(|p| p.sensor_id == sensor_id)?;
        Some(self.placements.remove(idx))
    }

    #[must_use]
    pub fn get(&self, sensor_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.sensor_id == sensor_id)
    }

    pub fn get_mut(&mut self, sensor_id: &str) -> Option<&mut Placement> {
        self.placements.iter_mut().find(|p| p.sensor_id == sensor_id)
    }

    #[must_use]
    pub fn contains(&self, sensor_id: &str) -> bool {
        self.get(sensor_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Placement] {
        &self.placements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Committed layout plus the optional draft of an active edit session.
#[derive(Debug, Clone, Default)]
pub struct LayoutEditor {
    committed: Layout,
    draft: Option<Layout>,
}

impl LayoutEditor {
    #[must_use]
    pub fn new(committed: Layout) -> Self {
        Self { committed, draft: None }
    }

    /// Start an edit session from the committed layout.
    ///
    /// An already open draft is abandoned, never carried over. Returns `true`
    /// when that happened.
    pub fn enter_edit(&mut self) -> bool {
        let abandoned = self.draft.replace(self.committed.clone()).is_some();
        if abandoned {
            debug!("previous layout draft abandoned");
        }
        abandoned
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    #[must_use]
    pub fn committed(&self) -> &Layout {
        &self.committed
    }

    #[must_use]
    pub fn draft(&self) -> Option<&Layout> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut Layout> {
        self.draft.as_mut()
    }

    /// The layout on screen: the draft while editing, otherwise the committed one.
    #[must_use]
    pub fn visible(&self) -> &Layout {
        self.draft.as_ref().unwrap_or(&self.committed)
    }

    /// Place `sensor_id` at `position` in the draft with the default scale.
    ///
    /// No-op (returns `false`) outside edit mode or if the sensor is already placed.
    pub fn add_placement(&mut self, sensor_id: &str, position: Point) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        draft.insert(Placement::new(sensor_id, position))
    }

    /// Drop a sensor's placement from the draft. Returns whether one was removed.
    pub fn remove_placement(&mut self, sensor_id: &str) -> bool {
        self.draft.as_mut().and_then(|d| d.remove(sensor_id)).is_some()
    }

    /// Replace the committed layout with the draft and end the session.
    ///
    /// Returns `false` (and changes nothing) when not editing.
    pub fn commit(&mut self) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        self.committed = draft;
        true
    }

    /// Drop the draft without touching the committed layout.
    pub fn discard(&mut self) -> bool {
        self.draft.take().is_some()
    }

    /// Replace the committed layout from storage. Any open draft is dropped.
    pub fn load(&mut self, committed: Layout) {
        self.committed = committed;
        self.draft = None;
    }

    /// Remove a sensor everywhere; used when the sensor itself is deleted.
    pub fn purge_sensor(&mut self, sensor_id: &str) {
        self.committed.remove(sensor_id);
        if let Some(draft) = self.draft.as_mut() {
            draft.remove(sensor_id);
        }
    }
}
