//! Interaction tuning parsed from JSON.
//!
//! Every field is optional in the JSON form; absent fields take the defaults
//! in [`crate::consts`]. The click thresholds are heuristics, so they live here
//! rather than as hard-coded constants, and touch input may use its own
//! duration limit.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{CLICK_MAX_DURATION_MS, RESIZE_SENSITIVITY_PX, VIEW_AUTOSAVE_DEBOUNCE_MS, ZOOM_STEP};
use crate::input::PointerKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// A motionless indicator press shorter than this opens the sensor editor.
    pub click_max_duration_ms: f64,
    /// Overrides `click_max_duration_ms` for touch input when set.
    pub touch_click_max_duration_ms: Option<f64>,
    /// Diagonal handle travel (px) that changes indicator scale by 1.0.
    pub resize_sensitivity_px: f64,
    /// Zoom button increment.
    pub zoom_step: f64,
    /// Quiet period before a pan/zoom change is autosaved.
    pub view_autosave_debounce_ms: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_max_duration_ms: CLICK_MAX_DURATION_MS,
            touch_click_max_duration_ms: None,
            resize_sensitivity_px: RESIZE_SENSITIVITY_PX,
            zoom_step: ZOOM_STEP,
            view_autosave_debounce_ms: VIEW_AUTOSAVE_DEBOUNCE_MS,
        }
    }
}

impl InteractionConfig {
    /// Parse and validate a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::NotPositive`] for a zero, negative or non-finite value.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("click_max_duration_ms", self.click_max_duration_ms)?;
        if let Some(touch) = self.touch_click_max_duration_ms {
            positive("touch_click_max_duration_ms", touch)?;
        }
        positive("resize_sensitivity_px", self.resize_sensitivity_px)?;
        positive("zoom_step", self.zoom_step)?;
        positive("view_autosave_debounce_ms", self.view_autosave_debounce_ms)?;
        Ok(())
    }

    /// Click duration limit for a pointer of `kind`.
    #[must_use]
    pub fn click_max_duration_for(&self, kind: PointerKind) -> f64 {
        match (kind, self.touch_click_max_duration_ms) {
            (PointerKind::Touch, Some(touch)) => touch,
            _ => self.click_max_duration_ms,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
