//! Input model: normalized pointer events and the gesture state machine states.
//!
//! Mouse, touch and pen events are all converted by the host into one
//! [`PointerInput`] record before they reach the engine, so the state machine
//! never branches on device type except for the configurable click threshold.
//! [`InputState`] is the single in-flight gesture, tracked from pointer-down to
//! pointer-up/cancel and carrying everything needed to compute deltas against
//! the values captured at its start.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::{MapRect, Point};
use crate::layout::Placement;
use crate::sensor::SensorId;

/// Pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    /// Left mouse button, a finger, or pen contact.
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button or pen barrel button.
    Secondary,
}

impl PointerButton {
    /// Map a DOM `button` code (`0`, `1`, `2`, …) to a button.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            0 => Self::Primary,
            _ => Self::Secondary,
        }
    }
}

/// Which kind of device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Map a DOM `pointerType` string. Unknown types are treated as mouse.
    #[must_use]
    pub fn from_dom(pointer_type: &str) -> Self {
        match pointer_type {
            "touch" => Self::Touch,
            "pen" => Self::Pen,
            _ => Self::Mouse,
        }
    }
}

/// `pointerId` the browser gives the mouse.
pub const PRIMARY_POINTER_ID: i32 = 1;

/// One pointer event, normalized at the host boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// Client (viewport) coordinates in CSS pixels.
    pub point: Point,
    pub button: PointerButton,
    pub kind: PointerKind,
    /// Whether the host may cancel the browser default (scroll/select).
    pub cancelable: bool,
    /// Monotonic event time in milliseconds.
    pub time_ms: f64,
    /// DOM `pointerId`; one finger or device keeps its id for a whole contact.
    pub pointer_id: i32,
}

impl PointerInput {
    /// A primary mouse event at `point`, time `time_ms`.
    #[must_use]
    pub fn primary(point: Point, time_ms: f64) -> Self {
        Self {
            point,
            button: PointerButton::Primary,
            kind: PointerKind::Mouse,
            cancelable: true,
            time_ms,
            pointer_id: PRIMARY_POINTER_ID,
        }
    }

    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    #[must_use]
    pub fn with_pointer_id(mut self, pointer_id: i32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

/// Start conditions shared by every gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Screen position of the pointer-down.
    pub start_pointer: Point,
    /// Map container rect at pointer-down; used for the whole gesture.
    pub map_rect: MapRect,
    /// Event time of the pointer-down.
    pub started_at_ms: f64,
    /// Device that started the gesture.
    pub kind: PointerKind,
    /// Set by the first pointer-move.
    pub moved: bool,
    /// The pointer that owns the gesture; events from any other pointer are ignored.
    pub pointer_id: i32,
}

impl Session {
    #[must_use]
    pub fn start(input: &PointerInput, map_rect: MapRect) -> Self {
        Self {
            start_pointer: input.point,
            map_rect,
            started_at_ms: input.time_ms,
            kind: input.kind,
            moved: false,
            pointer_id: input.pointer_id,
        }
    }

    /// Screen-pixel displacement of `current` from the start pointer.
    #[must_use]
    pub fn delta(&self, current: Point) -> Point {
        current.delta_from(self.start_pointer)
    }

    /// Milliseconds elapsed at `now_ms`.
    #[must_use]
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.started_at_ms
    }
}

/// The gesture state machine.
///
/// Each active variant carries the [`Session`] plus a snapshot of the value
/// being manipulated, so deltas always apply to the pre-gesture value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the map background to move the viewport.
    Panning {
        session: Session,
        /// Viewport pan at pointer-down.
        start_pan: Point,
    },
    /// Moving a placed indicator.
    DraggingIndicator {
        session: Session,
        id: SensorId,
        /// The placement as it was at pointer-down.
        start: Placement,
    },
    /// Scaling a placed indicator from its diagonal handle.
    ResizingIndicator {
        session: Session,
        id: SensorId,
        /// The placement as it was at pointer-down.
        start: Placement,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Idle => None,
            Self::Panning { session, .. }
            | Self::DraggingIndicator { session, .. }
            | Self::ResizingIndicator { session, .. } => Some(session),
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            Self::Idle => None,
            Self::Panning { session, .. }
            | Self::DraggingIndicator { session, .. }
            | Self::ResizingIndicator { session, .. } => Some(session),
        }
    }

    /// Whether `input` comes from the pointer that started the active gesture.
    #[must_use]
    pub fn is_owned_by(&self, input: &PointerInput) -> bool {
        self.session().is_some_and(|s| s.pointer_id == input.pointer_id)
    }

    /// The indicator being dragged or resized, if any.
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::DraggingIndicator { id, .. } | Self::ResizingIndicator { id, .. } => Some(id),
            Self::Idle | Self::Panning { .. } => None,
        }
    }
}
