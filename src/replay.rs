//! Scripted replay of host input through a [`SurfaceCore`].
//!
//! A script is a JSON document listing the map rect, an optional starting
//! snapshot and a sequence of steps (pointer events, button presses, clock
//! ticks). [`run`] feeds them to the engine, applies persistence actions to a
//! [`MemoryStore`] the way the browser host does, and reports the outcome.
//! The `floormap` binary is a thin wrapper around this.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::InteractionConfig;
use crate::geometry::{MapRect, Point};
use crate::hit::HitTarget;
use crate::input::{PRIMARY_POINTER_ID, PointerButton, PointerInput, PointerKind};
use crate::layout::Layout;
use crate::persist::{self, KeyValueStore, MemoryStore, Snapshot};
use crate::sensor::SensorKind;
use crate::surface::{Action, SurfaceCore};
use crate::viewport::Viewport;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("invalid script JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("step {index}: {message}")]
    Step { index: usize, message: String },
}

/// What a pointer-down lands on, as written in a script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HitSpec {
    #[default]
    Background,
    Body(String),
    Resize(String),
    Remove(String),
}

impl From<HitSpec> for HitTarget {
    fn from(spec: HitSpec) -> Self {
        match spec {
            HitSpec::Background => HitTarget::Background,
            HitSpec::Body(id) => HitTarget::IndicatorBody(id),
            HitSpec::Resize(id) => HitTarget::ResizeHandle(id),
            HitSpec::Remove(id) => HitTarget::RemoveButton(id),
        }
    }
}

/// A pointer event in a script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerSpec {
    pub x: f64,
    pub y: f64,
    pub t: f64,
    /// DOM `button` code; primary when absent.
    #[serde(default)]
    pub button: i16,
    /// DOM `pointerType`; mouse when absent.
    #[serde(default)]
    pub pointer: Option<String>,
    /// DOM `pointerId`; the mouse id when absent.
    #[serde(default = "default_pointer_id")]
    pub id: i32,
}

fn default_pointer_id() -> i32 {
    PRIMARY_POINTER_ID
}

impl PointerSpec {
    fn input(&self) -> PointerInput {
        PointerInput {
            point: Point::new(self.x, self.y),
            button: PointerButton::from_dom(self.button),
            kind: self.pointer.as_deref().map_or(PointerKind::Mouse, PointerKind::from_dom),
            cancelable: true,
            time_ms: self.t,
            pointer_id: self.id,
        }
    }
}

/// One scripted host input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Step {
    Down {
        #[serde(flatten)]
        pointer: PointerSpec,
        #[serde(default)]
        hit: HitSpec,
    },
    Move(PointerSpec),
    Up(PointerSpec),
    Cancel { t: f64 },
    EnterEdit,
    SaveEdit,
    CancelEdit,
    SaveSettings,
    #[serde(rename_all = "camelCase")]
    Select { sensor_id: Option<String> },
    #[serde(rename_all = "camelCase")]
    RemovePlacement { sensor_id: String },
    #[serde(rename_all = "camelCase")]
    AddSensor { name: String, kind: SensorKind },
    #[serde(rename_all = "camelCase")]
    RemoveSensor { sensor_id: String },
    ZoomIn { t: f64 },
    ZoomOut { t: f64 },
    ZoomBy { delta: f64, t: f64 },
    ResetView { t: f64 },
    Tick { t: f64 },
    Rect(MapRect),
}

/// A complete replay input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub rect: MapRect,
    /// Starting state; a first visit when absent.
    #[serde(default)]
    pub snapshot: Option<Snapshot>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script document.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Json`] for malformed input.
    pub fn from_json(raw: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Committed state at the end.
    pub snapshot: Snapshot,
    /// Open draft, if the script ended in edit mode.
    pub draft: Option<Layout>,
    pub viewport: Viewport,
    pub cursor: &'static str,
    /// Every action the engine emitted, in order.
    pub actions: Vec<Action>,
    /// Snapshot as read back from the store, if anything was persisted.
    pub stored: Option<Snapshot>,
}

/// Replay `script` through a fresh surface.
///
/// # Errors
///
/// Returns [`ReplayError::Step`] when a sensor step is rejected.
pub fn run(script: Script, config: InteractionConfig) -> Result<Report, ReplayError> {
    let mut core = SurfaceCore::new(config);
    let mut store = MemoryStore::new();
    let mut log = Vec::new();

    if let Some(snapshot) = script.snapshot {
        log.extend(core.load(snapshot));
    }
    log.extend(core.set_map_rect(script.rect));

    for (index, step) in script.steps.into_iter().enumerate() {
        debug!(index, ?step, "replay step");
        let actions = apply_step(&mut core, step).map_err(|message| ReplayError::Step { index, message })?;
        let mut follow_ups = Vec::new();
        for action in &actions {
            persist_action(&mut core, &mut store, action, &mut follow_ups);
        }
        log.extend(actions);
        log.extend(follow_ups);
    }

    let stored = if store.is_empty() { None } else { Some(persist::load_snapshot(&store)) };
    info!(actions = log.len(), editing = core.is_editing(), "replay finished");
    Ok(Report {
        snapshot: core.snapshot(),
        draft: core.layout().draft().cloned(),
        viewport: core.viewport(),
        cursor: core.cursor(),
        actions: log,
        stored,
    })
}

fn apply_step(core: &mut SurfaceCore, step: Step) -> Result<Vec<Action>, String> {
    let actions = match step {
        Step::Down { pointer, hit } => core.on_pointer_down(&pointer.input(), &hit.into()),
        Step::Move(pointer) => core.on_pointer_move(&pointer.input()),
        Step::Up(pointer) => core.on_pointer_up(&pointer.input()),
        Step::Cancel { t } => core.on_pointer_cancel(t),
        Step::EnterEdit => core.enter_edit(),
        Step::SaveEdit => core.save_edit(),
        Step::CancelEdit => core.cancel_edit(),
        Step::SaveSettings => core.save_settings(),
        Step::Select { sensor_id } => core.select_for_placement(sensor_id.as_deref()),
        Step::RemovePlacement { sensor_id } => core.remove_placement(&sensor_id),
        Step::AddSensor { name, kind } => {
            core.add_sensor(&name, kind).map_err(|e| e.to_string())?;
            vec![Action::RenderNeeded]
        }
        Step::RemoveSensor { sensor_id } => core.remove_sensor(&sensor_id),
        Step::ZoomIn { t } => core.zoom_in(t),
        Step::ZoomOut { t } => core.zoom_out(t),
        Step::ZoomBy { delta, t } => core.zoom_by(delta, t),
        Step::ResetView { t } => core.reset_view(t),
        Step::Tick { t } => core.tick(t),
        Step::Rect(rect) => core.set_map_rect(rect),
    };
    Ok(actions)
}

/// Apply storage actions the way the browser host does.
fn persist_action(core: &mut SurfaceCore, store: &mut dyn KeyValueStore, action: &Action, log: &mut Vec<Action>) {
    match action {
        Action::PersistSnapshot => {
            let result = persist::save_snapshot(store, &core.snapshot());
            log.extend(core.report_persist_result(result));
        }
        Action::PersistViewport(viewport) => {
            if let Err(e) = persist::save_viewport(store, viewport) {
                log.push(Action::Notice(e.to_string()));
            }
        }
        _ => {}
    }
}
