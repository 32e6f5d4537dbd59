//! Shared numeric constants for the map engine.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.5;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

/// Increment applied by the zoom-in / zoom-out buttons.
pub const ZOOM_STEP: f64 = 0.25;

// ── Placements ──────────────────────────────────────────────────

/// Smallest indicator scale.
pub const MIN_SCALE: f64 = 0.5;

/// Largest indicator scale.
pub const MAX_SCALE: f64 = 3.0;

/// Scale given to a freshly placed indicator, and to saved placements without one.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Upper bound of a percent coordinate on either axis.
pub const MAX_PERCENT: f64 = 100.0;

// ── Interaction ─────────────────────────────────────────────────

/// Screen pixels of diagonal handle travel that change scale by 1.0.
pub const RESIZE_SENSITIVITY_PX: f64 = 200.0;

/// A motionless press on an indicator shorter than this is a click.
pub const CLICK_MAX_DURATION_MS: f64 = 300.0;

// ── Persistence / data source ───────────────────────────────────

/// Quiet period after the last pan/zoom change before the view is autosaved.
pub const VIEW_AUTOSAVE_DEBOUNCE_MS: f64 = 500.0;

/// Period of the sensor simulator.
pub const SIMULATION_PERIOD_MS: u32 = 2000;

/// How often the browser host advances the engine clock to flush autosaves.
pub const CLOCK_TICK_MS: u32 = 100;
