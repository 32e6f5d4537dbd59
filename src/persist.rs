//! Persistence boundary: the stored snapshot and the key-value store it lives in.
//!
//! Each part of the dashboard state sits under its own key, as JSON:
//!
//! | Key                   | Value                                   |
//! |-----------------------|-----------------------------------------|
//! | `farmMapImage`        | background data URL, raw (not JSON)     |
//! | `configurableSensors` | `ConfigurableSensor[]`                  |
//! | `placedSensors`       | `Placement[]`                           |
//! | `farmMapView`         | `{ "zoom": f64, "panOffset": {x, y} }`  |
//!
//! Loading never fails. A key that is missing, unreadable or corrupt falls
//! back to its default on its own, so one bad value does not wipe the rest.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::background::MapImage;
use crate::layout::Layout;
use crate::sensor::{ConfigurableSensor, SensorRegistry};
use crate::viewport::Viewport;

pub const KEY_MAP_IMAGE: &str = "farmMapImage";
pub const KEY_SENSORS: &str = "configurableSensors";
pub const KEY_PLACEMENTS: &str = "placedSensors";
pub const KEY_VIEW: &str = "farmMapView";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage error: {0}")]
    Backend(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Minimal string key-value store, shaped after `window.localStorage`.
pub trait KeyValueStore {
    /// Read a key. `Ok(None)` when it was never written.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write a key.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the backend rejects the write (quota, privacy mode).
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Delete a key. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] when the backend rejects the delete.
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// In-memory store for tests and the replay binary.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, like a full or locked storage area.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        if self.read_only {
            return Err(PersistError::Backend(format!("write to {key} rejected")));
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        if self.read_only {
            return Err(PersistError::Backend(format!("delete of {key} rejected")));
        }
        self.entries.remove(key);
        Ok(())
    }
}

/// Everything the dashboard persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_image: Option<MapImage>,
    #[serde(default)]
    pub placements: Layout,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default = "default_sensors")]
    pub sensors: Vec<ConfigurableSensor>,
}

fn default_sensors() -> Vec<ConfigurableSensor> {
    SensorRegistry::with_defaults().as_slice().to_vec()
}

impl Default for Snapshot {
    /// A first visit: no image, nothing placed, identity view, seeded sensors.
    fn default() -> Self {
        Self {
            map_image: None,
            placements: Layout::new(),
            viewport: Viewport::default(),
            sensors: default_sensors(),
        }
    }
}

/// Read the snapshot, falling back per key.
pub fn load_snapshot(store: &dyn KeyValueStore) -> Snapshot {
    let defaults = Snapshot::default();

    let map_image = read_raw(store, KEY_MAP_IMAGE).filter(|s| !s.is_empty()).map(MapImage::from_stored);
    let sensors = read_json::<Vec<ConfigurableSensor>>(store, KEY_SENSORS).unwrap_or(defaults.sensors);
    let placements = read_json::<Layout>(store, KEY_PLACEMENTS).unwrap_or_default();
    let viewport = read_json::<Viewport>(store, KEY_VIEW).map(Viewport::sanitized).unwrap_or_default();

    debug!(sensors = sensors.len(), placements = placements.len(), has_image = map_image.is_some(), "snapshot loaded");
    Snapshot { map_image, placements, viewport, sensors }
}

/// Write every key of `snapshot`. The image key is removed when there is no image.
///
/// # Errors
///
/// Returns the first [`PersistError`]; keys before it have been written.
pub fn save_snapshot(store: &mut dyn KeyValueStore, snapshot: &Snapshot) -> Result<(), PersistError> {
    match &snapshot.map_image {
        Some(image) => store.set(KEY_MAP_IMAGE, image.as_str())?,
        None => store.remove(KEY_MAP_IMAGE)?,
    }
    store.set(KEY_SENSORS, &serde_json::to_string(&snapshot.sensors)?)?;
    store.set(KEY_PLACEMENTS, &serde_json::to_string(&snapshot.placements)?)?;
    save_viewport(store, &snapshot.viewport)
}

/// Write only the viewport key; used by the debounced autosave.
///
/// # Errors
///
/// Returns a [`PersistError`] if serialization or the write fails.
pub fn save_viewport(store: &mut dyn KeyValueStore, viewport: &Viewport) -> Result<(), PersistError> {
    store.set(KEY_VIEW, &serde_json::to_string(viewport)?)
}

fn read_raw(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "storage read failed; using default");
            None
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = read_raw(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "stored value is corrupt; using default");
            None
        }
    }
}
