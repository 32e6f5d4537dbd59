//! Map surface: the composition root of the interaction engine.
//!
//! [`SurfaceCore`] owns every piece of state the map needs (sensors, layout
//! editor, viewport, the in-flight gesture) and routes host input to them.
//! Every handler returns a list of [`Action`]s; the host applies them
//! (attaching listeners, writing storage, opening the sensor editor) and
//! re-renders from [`SurfaceCore::scene`]. No browser types appear here, so
//! the whole engine runs under plain `cargo test`.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::autosave::Debouncer;
use crate::background::MapImage;
use crate::config::InteractionConfig;
use crate::geometry::{MapRect, screen_to_percent};
use crate::hit::HitTarget;
use crate::input::{InputState, PointerButton, PointerInput, Session};
use crate::interaction::{self, EndReason, MoveEffect, Release};
use crate::layout::{Layout, LayoutEditor};
use crate::persist::{PersistError, Snapshot};
use crate::render::{Scene, SceneSource, build_scene};
use crate::sensor::{ConfigurableSensor, Readings, SensorError, SensorId, SensorKind, SensorRegistry};
use crate::viewport::{Viewport, ViewportController};

pub const CURSOR_DEFAULT: &str = "default";
pub const CURSOR_GRAB: &str = "grab";
pub const CURSOR_GRABBING: &str = "grabbing";
pub const CURSOR_RESIZE: &str = "nwse-resize";
pub const CURSOR_CROSSHAIR: &str = "crosshair";

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Action {
    /// A gesture started: listen for move/up/cancel/blur on the window.
    AttachPointerListeners,
    /// The gesture ended: drop the window listeners.
    DetachPointerListeners,
    /// Cancel the browser default for the current event.
    PreventDefault,
    /// Open the editor for this sensor.
    EditSensor(SensorId),
    SetCursor(String),
    RenderNeeded,
    /// Write [`SurfaceCore::snapshot`] to storage and report back.
    PersistSnapshot,
    /// Write just the view key (debounced autosave).
    PersistViewport(Viewport),
    /// Show a non-blocking message to the user.
    Notice(String),
}

/// Engine state with no browser dependencies.
#[derive(Debug, Clone)]
pub struct SurfaceCore {
    config: InteractionConfig,
    sensors: SensorRegistry,
    layout: LayoutEditor,
    viewport: ViewportController,
    input: InputState,
    map_rect: MapRect,
    map_image: Option<MapImage>,
    placing: Option<SensorId>,
    notice: Option<String>,
    autosave: Debouncer,
    /// Latest host time seen, for paths that end a gesture without an event.
    clock_ms: f64,
}

impl Default for SurfaceCore {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl SurfaceCore {
    /// A first-visit surface: default sensors, empty layout, identity view.
    #[must_use]
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            sensors: SensorRegistry::with_defaults(),
            layout: LayoutEditor::default(),
            viewport: ViewportController::new(config.zoom_step),
            input: InputState::Idle,
            map_rect: MapRect::default(),
            map_image: None,
            placing: None,
            notice: None,
            autosave: Debouncer::new(config.view_autosave_debounce_ms),
            clock_ms: 0.0,
        }
    }

    // --- Data inputs ---

    /// Replace all state from a stored snapshot. An active gesture or edit
    /// session is dropped.
    pub fn load(&mut self, snapshot: Snapshot) -> Vec<Action> {
        let mut actions = self.end_gesture(EndReason::Cancelled);
        self.sensors = SensorRegistry::from_sensors(snapshot.sensors);
        self.layout.load(snapshot.placements);
        self.viewport.replace(snapshot.viewport);
        self.map_image = snapshot.map_image;
        self.placing = None;
        self.autosave.cancel();
        info!(sensors = self.sensors.len(), placements = self.layout.committed().len(), "surface loaded");
        actions.push(self.cursor_action());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// The committed state, as it should be stored. An open draft is not included.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            map_image: self.map_image.clone(),
            placements: self.layout.committed().clone(),
            viewport: self.viewport.viewport(),
            sensors: self.sensors.as_slice().to_vec(),
        }
    }

    /// Record the map container's on-screen rect (after layout or resize).
    pub fn set_map_rect(&mut self, rect: MapRect) -> Vec<Action> {
        if rect == self.map_rect {
            return Vec::new();
        }
        self.map_rect = rect;
        self.viewport.set_map_size(rect.width, rect.height);
        vec![Action::RenderNeeded]
    }

    /// Set or clear the background. Refused while editing.
    pub fn set_map_image(&mut self, image: Option<MapImage>) -> Vec<Action> {
        if self.is_editing() {
            return vec![Action::Notice("Finish editing the layout before changing the map.".into())];
        }
        self.map_image = image;
        vec![Action::RenderNeeded]
    }

    /// Apply live readings. An active gesture is left untouched.
    pub fn apply_readings(&mut self, readings: &Readings) -> Vec<Action> {
        self.sensors.apply_readings(readings);
        vec![Action::RenderNeeded]
    }

    // --- Sensors ---

    /// Create a sensor. It starts unplaced.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::EmptyName`] for a blank name.
    pub fn add_sensor(&mut self, name: &str, kind: SensorKind) -> Result<SensorId, SensorError> {
        let id = self.sensors.add(name, kind)?;
        debug!(%id, ?kind, "sensor added");
        Ok(id)
    }

    /// Rename a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::EmptyName`] or [`SensorError::NotFound`].
    pub fn rename_sensor(&mut self, id: &str, name: &str) -> Result<(), SensorError> {
        self.sensors.rename(id, name)
    }

    /// Delete a sensor and every placement of it. A gesture on its indicator is cancelled.
    pub fn remove_sensor(&mut self, id: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.input.target_id() == Some(id) {
            actions.extend(self.end_gesture(EndReason::Cancelled));
        }
        if self.sensors.remove(id).is_none() {
            return actions;
        }
        self.layout.purge_sensor(id);
        if self.placing.as_deref() == Some(id) {
            self.placing = None;
            actions.push(self.cursor_action());
        }
        debug!(%id, "sensor removed");
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Edit mode ---

    /// Start editing from the committed layout. Re-entering discards the old draft.
    pub fn enter_edit(&mut self) -> Vec<Action> {
        let mut actions = self.end_gesture(EndReason::Cancelled);
        self.layout.enter_edit();
        self.placing = None;
        actions.push(self.cursor_action());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Commit the draft and ask the host to persist. No-op when not editing.
    pub fn save_edit(&mut self) -> Vec<Action> {
        if !self.is_editing() {
            return Vec::new();
        }
        let mut actions = self.end_gesture(EndReason::Cancelled);
        self.layout.commit();
        self.placing = None;
        self.autosave.cancel();
        info!(placements = self.layout.committed().len(), "layout saved");
        actions.push(self.cursor_action());
        actions.push(Action::RenderNeeded);
        actions.push(Action::PersistSnapshot);
        actions
    }

    /// Drop the draft. No-op when not editing.
    pub fn cancel_edit(&mut self) -> Vec<Action> {
        if !self.is_editing() {
            return Vec::new();
        }
        let mut actions = self.end_gesture(EndReason::Cancelled);
        self.layout.discard();
        self.placing = None;
        actions.push(self.cursor_action());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Explicit "save settings": persist everything now.
    pub fn save_settings(&mut self) -> Vec<Action> {
        self.autosave.cancel();
        vec![Action::PersistSnapshot]
    }

    /// Choose the sensor the next background press will place, or clear the choice.
    ///
    /// Only known, unplaced sensors can be chosen, and only while editing.
    pub fn select_for_placement(&mut self, id: Option<&str>) -> Vec<Action> {
        let next = match id {
            None => None,
            Some(id) => {
                let placeable = self.is_editing() && self.sensors.contains(id) && !self.layout.visible().contains(id);
                if !placeable {
                    return Vec::new();
                }
                Some(id.to_owned())
            }
        };
        if next == self.placing {
            return Vec::new();
        }
        self.placing = next;
        vec![self.cursor_action(), Action::RenderNeeded]
    }

    /// Sensors with no placement in the visible layout, in registry order.
    #[must_use]
    pub fn unplaced_sensors(&self) -> Vec<&ConfigurableSensor> {
        let layout = self.layout.visible();
        self.sensors.iter().filter(|s| !layout.contains(&s.id)).collect()
    }

    /// Take an indicator off the map (draft only).
    pub fn remove_placement(&mut self, id: &str) -> Vec<Action> {
        if !self.is_editing() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if self.input.target_id() == Some(id) {
            actions.extend(self.end_gesture(EndReason::Cancelled));
        }
        if self.layout.remove_placement(id) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    // --- Viewport ---

    pub fn zoom_in(&mut self, now_ms: f64) -> Vec<Action> {
        let changed = self.viewport.zoom_in();
        self.view_changed(changed, now_ms)
    }

    pub fn zoom_out(&mut self, now_ms: f64) -> Vec<Action> {
        let changed = self.viewport.zoom_out();
        self.view_changed(changed, now_ms)
    }

    pub fn zoom_by(&mut self, delta: f64, now_ms: f64) -> Vec<Action> {
        let changed = self.viewport.zoom_by(delta);
        self.view_changed(changed, now_ms)
    }

    pub fn reset_view(&mut self, now_ms: f64) -> Vec<Action> {
        let changed = self.viewport.reset_view();
        self.view_changed(changed, now_ms)
    }

    fn view_changed(&mut self, changed: bool, now_ms: f64) -> Vec<Action> {
        self.clock_ms = now_ms;
        if !changed {
            return Vec::new();
        }
        self.autosave.touch(now_ms);
        vec![self.cursor_action(), Action::RenderNeeded]
    }

    // --- Input events ---

    /// Route a pointer-down by what it hit.
    pub fn on_pointer_down(&mut self, input: &PointerInput, hit: &HitTarget) -> Vec<Action> {
        self.clock_ms = input.time_ms;
        if input.button != PointerButton::Primary || !self.input.is_idle() || self.map_rect.is_degenerate() {
            return Vec::new();
        }

        let editing = self.is_editing();
        let hit = self.resolve_hit(hit);
        match hit {
            HitTarget::RemoveButton(id) if editing => {
                let mut actions = self.remove_placement(&id);
                if input.cancelable {
                    actions.insert(0, Action::PreventDefault);
                }
                actions
            }
            HitTarget::Background if editing && self.placing.is_some() => self.place_pending(input),
            HitTarget::IndicatorBody(id) if editing => self.start_indicator_gesture(input, id, false),
            HitTarget::ResizeHandle(id) if editing => self.start_indicator_gesture(input, id, true),
            _ => {
                let session = Session::start(input, self.map_rect);
                self.input = InputState::Panning { session, start_pan: self.viewport.viewport().pan };
                self.gesture_started(false)
            }
        }
    }

    /// Advance the active gesture. Moves from other pointers are ignored.
    pub fn on_pointer_move(&mut self, input: &PointerInput) -> Vec<Action> {
        self.clock_ms = input.time_ms;
        if !self.input.is_owned_by(input) {
            return Vec::new();
        }
        let Some(effect) = interaction::on_move(&mut self.input, input, self.viewport.zoom(), &self.config) else {
            return Vec::new();
        };
        match effect {
            MoveEffect::Pan(pan) => {
                let before = self.viewport.viewport().pan;
                if self.viewport.pan_to(pan) != before {
                    self.autosave.touch(input.time_ms);
                }
            }
            MoveEffect::Position { id, position } => {
                if let Some(placement) = self.layout.draft_mut().and_then(|d| d.get_mut(&id)) {
                    placement.position = position;
                }
            }
            MoveEffect::Scale { id, scale } => {
                if let Some(placement) = self.layout.draft_mut().and_then(|d| d.get_mut(&id)) {
                    placement.scale = scale;
                }
            }
        }
        let mut actions = Vec::with_capacity(2);
        if input.cancelable {
            actions.push(Action::PreventDefault);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Finish the active gesture; a quick motionless press on an indicator opens its editor.
    pub fn on_pointer_up(&mut self, input: &PointerInput) -> Vec<Action> {
        self.clock_ms = input.time_ms;
        if !self.input.is_owned_by(input) {
            return Vec::new();
        }
        self.end_gesture(EndReason::PointerUp)
    }

    /// A `pointercancel` for one pointer; ends the gesture only if that pointer owns it.
    pub fn on_pointer_lost(&mut self, input: &PointerInput) -> Vec<Action> {
        if !self.input.is_owned_by(input) {
            self.clock_ms = input.time_ms;
            return Vec::new();
        }
        self.on_pointer_cancel(input.time_ms)
    }

    /// Pointer-cancel, lost capture or window blur: end without a click.
    pub fn on_pointer_cancel(&mut self, now_ms: f64) -> Vec<Action> {
        self.clock_ms = now_ms;
        self.end_gesture(EndReason::Cancelled)
    }

    /// Advance the host clock; flushes the debounced viewport save.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        self.clock_ms = now_ms;
        if self.autosave.poll(now_ms) {
            debug!(zoom = self.viewport.zoom(), "viewport autosave due");
            return vec![Action::PersistViewport(self.viewport.viewport())];
        }
        Vec::new()
    }

    /// Feed back the outcome of a [`Action::PersistSnapshot`].
    pub fn report_persist_result(&mut self, result: Result<(), PersistError>) -> Vec<Action> {
        match result {
            Ok(()) => {
                debug!("snapshot persisted");
                if self.notice.take().is_some() {
                    return vec![Action::RenderNeeded];
                }
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "snapshot persist failed");
                let message = format!("Could not save settings: {e}");
                self.notice = Some(message.clone());
                vec![Action::Notice(message), Action::RenderNeeded]
            }
        }
    }

    pub fn dismiss_notice(&mut self) -> Vec<Action> {
        if self.notice.take().is_some() {
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    // --- Queries ---

    /// CSS cursor for the map container.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        match &self.input {
            InputState::Panning { .. } | InputState::DraggingIndicator { .. } => CURSOR_GRABBING,
            InputState::ResizingIndicator { .. } => CURSOR_RESIZE,
            InputState::Idle if self.is_editing() && self.placing.is_some() => CURSOR_CROSSHAIR,
            InputState::Idle if !self.is_editing() && self.viewport.zoom() > 1.0 => CURSOR_GRAB,
            InputState::Idle => CURSOR_DEFAULT,
        }
    }

    /// Everything the renderer needs.
    #[must_use]
    pub fn scene(&self) -> Scene {
        build_scene(&SceneSource {
            sensors: &self.sensors,
            layout: self.layout.visible(),
            viewport: &self.viewport,
            map_image: self.map_image.as_ref(),
            editing: self.is_editing(),
            placing: self.placing.as_deref(),
            active_id: self.input.target_id(),
            cursor: self.cursor(),
            notice: self.notice.as_deref(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    #[must_use]
    pub fn sensors(&self) -> &SensorRegistry {
        &self.sensors
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutEditor {
        &self.layout
    }

    /// The layout on screen (draft while editing).
    #[must_use]
    pub fn visible_layout(&self) -> &Layout {
        self.layout.visible()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    #[must_use]
    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.layout.is_editing()
    }

    #[must_use]
    pub fn placing(&self) -> Option<&str> {
        self.placing.as_deref()
    }

    #[must_use]
    pub fn map_image(&self) -> Option<&MapImage> {
        self.map_image.as_ref()
    }

    #[must_use]
    pub fn map_rect(&self) -> MapRect {
        self.map_rect
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    // --- Internals ---

    /// Demote targets that name something not placed in the visible layout.
    fn resolve_hit(&self, hit: &HitTarget) -> HitTarget {
        match hit.sensor_id() {
            Some(id) if !self.layout.visible().contains(id) => HitTarget::Background,
            _ => hit.clone(),
        }
    }

    fn place_pending(&mut self, input: &PointerInput) -> Vec<Action> {
        let Some(id) = self.placing.take() else {
            return Vec::new();
        };
        let position = screen_to_percent(input.point, &self.map_rect, &self.viewport.viewport());
        if self.layout.add_placement(&id, position) {
            debug!(%id, x = position.x, y = position.y, "sensor placed");
        }
        vec![self.cursor_action(), Action::RenderNeeded]
    }

    fn start_indicator_gesture(&mut self, input: &PointerInput, id: SensorId, resize: bool) -> Vec<Action> {
        let Some(start) = self.layout.visible().get(&id).cloned() else {
            return Vec::new();
        };
        let session = Session::start(input, self.map_rect);
        self.input = if resize {
            InputState::ResizingIndicator { session, id, start }
        } else {
            InputState::DraggingIndicator { session, id, start }
        };
        self.gesture_started(input.cancelable)
    }

    fn gesture_started(&self, prevent_default: bool) -> Vec<Action> {
        let mut actions = vec![Action::AttachPointerListeners];
        if prevent_default {
            actions.push(Action::PreventDefault);
        }
        actions.push(self.cursor_action());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// End the active gesture, if any. Emits exactly one detach per started gesture.
    fn end_gesture(&mut self, reason: EndReason) -> Vec<Action> {
        let release = interaction::finish(&mut self.input, self.clock_ms, reason, &self.config);
        let click = match release {
            Release::Idle => return Vec::new(),
            Release::Finished => None,
            Release::Click(id) => Some(id),
        };
        let mut actions = vec![Action::DetachPointerListeners, self.cursor_action()];
        if let Some(id) = click {
            debug!(%id, "indicator clicked");
            actions.push(Action::EditSensor(id));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn cursor_action(&self) -> Action {
        Action::SetCursor(self.cursor().to_owned())
    }
}
