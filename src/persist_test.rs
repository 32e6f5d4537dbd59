#![allow(clippy::float_cmp)]

use super::*;
use crate::geometry::Point;
use crate::layout::Placement;
use crate::sensor::SensorKind;

fn store_with(entries: &[(&str, &str)]) -> MemoryStore {
    let mut store = MemoryStore::new();
    for (k, v) in entries {
        store.set(k, v).unwrap();
    }
    store
}

struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, PersistError> {
        Err(PersistError::Unavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistError> {
        Err(PersistError::Unavailable)
    }

    fn remove(&mut self, _key: &str) -> Result<(), PersistError> {
        Err(PersistError::Unavailable)
    }
}

// =============================================================
// load_snapshot
// =============================================================

#[test]
fn empty_store_loads_first_visit_defaults() {
    let snapshot = load_snapshot(&MemoryStore::new());
    assert_eq!(snapshot.map_image, None);
    assert!(snapshot.placements.is_empty());
    assert!(snapshot.viewport.is_identity());
    assert_eq!(snapshot.sensors.len(), 4);
    assert_eq!(snapshot.sensors[0].id, "sensor_1720000000001");
}

#[test]
fn unreadable_store_loads_defaults() {
    let snapshot = load_snapshot(&BrokenStore);
    assert_eq!(snapshot, Snapshot::default());
}

#[test]
fn stored_keys_are_read() {
    let store = store_with(&[
        (KEY_MAP_IMAGE, "data:image/png;base64,AAAA"),
        (KEY_SENSORS, r#"[{"id":"s1","name":"Pump","type":"status","status":"ok","value":"Idle"}]"#),
        (KEY_PLACEMENTS, r#"[{"sensorId":"s1","position":{"x":10,"y":20},"scale":2}]"#),
        (KEY_VIEW, r#"{"zoom":2,"panOffset":{"x":-40,"y":-10}}"#),
    ]);
    let snapshot = load_snapshot(&store);
    assert_eq!(snapshot.map_image.as_ref().map(MapImage::as_str), Some("data:image/png;base64,AAAA"));
    assert_eq!(snapshot.sensors.len(), 1);
    assert_eq!(snapshot.sensors[0].kind, SensorKind::Status);
    assert_eq!(snapshot.placements.get("s1").unwrap().scale, 2.0);
    assert_eq!(snapshot.viewport.zoom, 2.0);
    assert_eq!(snapshot.viewport.pan, Point::new(-40.0, -10.0));
}

#[test]
fn missing_scale_defaults_to_one() {
    let store = store_with(&[(KEY_PLACEMENTS, r#"[{"sensorId":"s1","position":{"x":10,"y":20}},{"sensorId":"s2","position":{"x":1,"y":2},"scale":null}]"#)]);
    let snapshot = load_snapshot(&store);
    assert_eq!(snapshot.placements.get("s1").unwrap().scale, 1.0);
    assert_eq!(snapshot.placements.get("s2").unwrap().scale, 1.0);
}

#[test]
fn corrupt_key_falls_back_alone() {
    let store = store_with(&[
        (KEY_SENSORS, "not json"),
        (KEY_PLACEMENTS, r#"[{"sensorId":"s1","position":{"x":10,"y":20}}]"#),
    ]);
    let snapshot = load_snapshot(&store);
    assert_eq!(snapshot.sensors.len(), 4);
    assert_eq!(snapshot.placements.len(), 1);
}

#[test]
fn empty_sensor_list_is_respected() {
    let store = store_with(&[(KEY_SENSORS, "[]")]);
    assert!(load_snapshot(&store).sensors.is_empty());
}

#[test]
fn loaded_view_is_sanitized() {
    let store = store_with(&[(KEY_VIEW, r#"{"zoom":0,"panOffset":{"x":-40,"y":-10}}"#)]);
    let snapshot = load_snapshot(&store);
    assert_eq!(snapshot.viewport.zoom, 1.0);
    assert_eq!(snapshot.viewport.pan, Point::zero());

    let store = store_with(&[(KEY_VIEW, r#"{"zoom":9}"#)]);
    assert_eq!(load_snapshot(&store).viewport.zoom, 4.0);
}

#[test]
fn out_of_range_placements_are_clamped_on_load() {
    let store = store_with(&[(KEY_PLACEMENTS, r#"[{"sensorId":"s1","position":{"x":-5,"y":140},"scale":9}]"#)]);
    let placement = load_snapshot(&store).placements.get("s1").cloned().unwrap();
    assert_eq!(placement.position, Point::new(0.0, 100.0));
    assert_eq!(placement.scale, 3.0);
}

// =============================================================
// save_snapshot / save_viewport
// =============================================================

#[test]
fn save_then_load_restores_snapshot() {
    let mut store = MemoryStore::new();
    let mut placements = Layout::new();
    placements.insert(Placement::new("sensor_1720000000001", Point::new(40.0, 60.0)));
    let snapshot = Snapshot {
        map_image: Some(MapImage::from_stored("data:image/svg+xml;base64,PHN2Zz4=")),
        placements,
        viewport: Viewport { zoom: 1.5, pan: Point::new(-20.0, -5.0) },
        ..Snapshot::default()
    };
    save_snapshot(&mut store, &snapshot).unwrap();
    assert_eq!(store.len(), 4);
    assert_eq!(load_snapshot(&store), snapshot);
}

#[test]
fn saving_without_image_removes_key() {
    let mut store = store_with(&[(KEY_MAP_IMAGE, "data:old")]);
    save_snapshot(&mut store, &Snapshot::default()).unwrap();
    assert_eq!(store.get(KEY_MAP_IMAGE).unwrap(), None);
}

#[test]
fn viewport_uses_pan_offset_name() {
    let mut store = MemoryStore::new();
    save_viewport(&mut store, &Viewport { zoom: 2.0, pan: Point::new(-1.0, -2.0) }).unwrap();
    let raw = store.get(KEY_VIEW).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["zoom"], 2.0);
    assert_eq!(value["panOffset"]["x"], -1.0);
}

#[test]
fn read_only_store_reports_error() {
    let mut store = MemoryStore::new();
    store.set_read_only(true);
    assert!(matches!(save_snapshot(&mut store, &Snapshot::default()), Err(PersistError::Backend(_))));
    assert!(store.is_empty());
}
