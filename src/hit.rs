#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::layout::Layout;
use crate::sensor::SensorId;

/// Marker attribute value on an indicator's body element.
pub const ROLE_BODY: &str = "body";
/// Marker attribute value on an indicator's resize handle.
pub const ROLE_RESIZE: &str = "resize";
/// Marker attribute value on an indicator's remove button.
pub const ROLE_REMOVE: &str = "remove";

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HitTarget {
    /// The map itself, or anything that is not part of an indicator.
    #[default]
    Background,
    IndicatorBody(SensorId),
    ResizeHandle(SensorId),
    RemoveButton(SensorId),
}

impl HitTarget {
    /// Resolve the marker found on (or above) the event target.
    ///
    /// `role` and `sensor_id` come from the element's `data-hit` and
    /// `data-sensor-id` attributes. Anything that does not name a sensor placed
    /// in `layout` is background.
    #[must_use]
    pub fn from_marker(role: Option<&str>, sensor_id: Option<&str>, layout: &Layout) -> Self {
        let (Some(role), Some(id)) = (role, sensor_id) else {
            return Self::Background;
        };
        if !layout.contains(id) {
            return Self::Background;
        }
        match role {
            ROLE_BODY => Self::IndicatorBody(id.to_owned()),
            ROLE_RESIZE => Self::ResizeHandle(id.to_owned()),
            ROLE_REMOVE => Self::RemoveButton(id.to_owned()),
            _ => Self::Background,
        }
    }

    /// The indicator this target belongs to, if any.
    #[must_use]
    pub fn sensor_id(&self) -> Option<&str> {
        match self {
            Self::Background => None,
            Self::IndicatorBody(id) | Self::ResizeHandle(id) | Self::RemoveButton(id) => Some(id),
        }
    }
}
