//! Interaction engine for the floor-plan sensor map.
//!
//! The map shows a user-supplied floor-plan image with sensor indicators
//! placed on it. This crate owns the interaction model: pan and zoom of the
//! map layer, dragging, resizing and placing indicators in edit mode, click
//! detection, per-key persistence, and the simulated live readings. Everything
//! except [`dom`] is plain Rust and runs under `cargo test`; the `dom` module
//! is the WebAssembly host that wires browser events to [`surface::SurfaceCore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`surface`] | Composition root; testable [`surface::SurfaceCore`] and its [`surface::Action`]s |
//! | [`geometry`] | Points, the map rect and screen/percent conversions |
//! | [`viewport`] | Zoom and pan state with clamping |
//! | [`layout`] | Placements, committed layout and the edit draft |
//! | [`sensor`] | Sensor registry and live readings |
//! | [`input`] | Normalized pointer input and the gesture state machine |
//! | [`interaction`] | Drag, resize and pan updates; click detection |
//! | [`hit`] | What a pointer-down landed on |
//! | [`render`] | Scene description for the host to draw |
//! | [`background`] | Floor-plan image upload validation |
//! | [`persist`] | Storage keys, snapshot load/save |
//! | [`autosave`] | Debounce for the viewport autosave |
//! | [`simulator`] | Random-walk live readings |
//! | [`config`] | Interaction thresholds parsed from JSON |
//! | [`replay`] | Scripted input replay used by the `floormap` binary |
//! | [`consts`] | Shared numeric constants (zoom limits, scale bounds, etc.) |

pub mod autosave;
pub mod background;
pub mod config;
pub mod consts;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod persist;
pub mod render;
pub mod replay;
pub mod sensor;
pub mod simulator;
pub mod surface;
pub mod viewport;
