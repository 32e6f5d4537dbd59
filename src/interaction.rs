//! Gesture math: what each pointer-move does, and what pointer-up means.
//!
//! These are reducer-style functions over [`InputState`]. They compute the new
//! value from the snapshot taken at pointer-down plus the total screen delta,
//! never from the previous move, so the last move before release alone decides
//! the final state. Applying the result to the viewport or layout is left to
//! the surface.

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;

use crate::config::InteractionConfig;
use crate::consts::{MAX_PERCENT, MAX_SCALE, MIN_SCALE};
use crate::geometry::{MapRect, Point, screen_delta_to_percent};
use crate::input::{InputState, PointerInput};
use crate::layout::Placement;
use crate::sensor::SensorId;
use crate::viewport::clamp_pan;

/// The mutation a pointer-move asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveEffect {
    /// Set the viewport pan (already clamped).
    Pan(Point),
    /// Set an indicator's position in percent (already clamped).
    Position { id: SensorId, position: Point },
    /// Set an indicator's scale (already clamped).
    Scale { id: SensorId, scale: f64 },
}

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Normal pointer release.
    PointerUp,
    /// Pointer-cancel, lost capture, window blur, or the session was torn down.
    Cancelled,
}

/// What the host should make of a finished gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    /// No gesture was active.
    Idle,
    /// The incremental mutations stand as applied.
    Finished,
    /// A motionless quick press on an indicator: open its editor.
    Click(SensorId),
}

/// Pan for a total screen `delta` from `start_pan`, clamped to the map.
#[must_use]
pub fn pan_for_delta(start_pan: Point, delta: Point, zoom: f64, rect: &MapRect) -> Point {
    clamp_pan(start_pan.offset_by(delta), zoom, rect.width, rect.height)
}

/// Indicator position after dragging `start` by a screen `delta` at `zoom`.
///
/// Each axis is clamped to `[0, 100]` independently.
#[must_use]
pub fn drag_position(start: &Placement, delta: Point, rect: &MapRect, zoom: f64) -> Point {
    let moved = screen_delta_to_percent(delta, rect, zoom);
    start.position.offset_by(moved).clamp_each(MAX_PERCENT)
}

/// Indicator scale after pulling the diagonal handle by `delta`.
///
/// Down-right grows, up-left shrinks; `sensitivity` pixels of `dx + dy` is one
/// unit of scale.
#[must_use]
pub fn resize_scale(start_scale: f64, delta: Point, sensitivity: f64) -> f64 {
    (start_scale + (delta.x + delta.y) / sensitivity).clamp(MIN_SCALE, MAX_SCALE)
}

/// Advance the active gesture for a pointer-move.
///
/// Marks the session as moved and returns the mutation to apply, or `None`
/// when idle. `zoom` is the current viewport zoom.
pub fn on_move(
    state: &mut InputState,
    input: &PointerInput,
    zoom: f64,
    config: &InteractionConfig,
) -> Option<MoveEffect> {
    let session = state.session_mut()?;
    session.moved = true;
    let delta = session.delta(input.point);
    let rect = session.map_rect;

    let effect = match state {
        InputState::Idle => return None,
        InputState::Panning { start_pan, .. } => MoveEffect::Pan(pan_for_delta(*start_pan, delta, zoom, &rect)),
        InputState::DraggingIndicator { id, start, .. } => MoveEffect::Position {
            id: id.clone(),
            position: drag_position(start, delta, &rect, zoom),
        },
        InputState::ResizingIndicator { id, start, .. } => MoveEffect::Scale {
            id: id.clone(),
            scale: resize_scale(start.scale, delta, config.resize_sensitivity_px),
        },
    };
    Some(effect)
}

/// End the active gesture and classify it. `state` is left `Idle`.
///
/// Only an indicator drag that never moved and was released within the click
/// threshold counts as a click; a cancelled gesture never does.
pub fn finish(state: &mut InputState, now_ms: f64, reason: EndReason, config: &InteractionConfig) -> Release {
    let ended = std::mem::take(state);
    match ended {
        InputState::Idle => Release::Idle,
        InputState::DraggingIndicator { session, id, .. }
            if reason == EndReason::PointerUp
                && !session.moved
                && session.elapsed_ms(now_ms) < config.click_max_duration_for(session.kind) =>
        {
            Release::Click(id)
        }
        InputState::Panning { .. } | InputState::DraggingIndicator { .. } | InputState::ResizingIndicator { .. } => {
            Release::Finished
        }
    }
}
