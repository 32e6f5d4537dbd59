#![allow(clippy::float_cmp)]

use super::*;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn placed(id: &str, x: f64, y: f64) -> Placement {
    Placement::new(id, pt(x, y))
}

fn editor_with(ids: &[&str]) -> LayoutEditor {
    let layout = Layout::from_placements(ids.iter().map(|id| placed(id, 10.0, 10.0)).collect());
    LayoutEditor::new(layout)
}

fn ids(layout: &Layout) -> Vec<&str> {
    layout.iter().map(|p| p.sensor_id.as_str()).collect()
}

// =============================================================
// Placement
// =============================================================

#[test]
fn placement_new_has_default_scale() {
    let p = placed("S1", 40.0, 60.0);
    assert_eq!(p.scale, 1.0);
    assert_eq!(p.position, pt(40.0, 60.0));
}

#[test]
fn placement_new_clamps_position() {
    let p = placed("S1", -3.0, 104.0);
    assert_eq!(p.position, pt(0.0, 100.0));
}

#[test]
fn placement_deserializes_camel_case() {
    let p: Placement = serde_json::from_str(r#"{"sensorId":"S1","position":{"x":12.5,"y":80.0},"scale":2.0}"#).unwrap();
    assert_eq!(p.sensor_id, "S1");
    assert_eq!(p.scale, 2.0);
}

#[test]
fn placement_missing_scale_defaults_to_one() {
    let p: Placement = serde_json::from_str(r#"{"sensorId":"S1","position":{"x":1.0,"y":2.0}}"#).unwrap();
    assert_eq!(p.scale, 1.0);
}

#[test]
fn placement_null_or_zero_scale_defaults_to_one() {
    let a: Placement = serde_json::from_str(r#"{"sensorId":"S1","position":{"x":1.0,"y":2.0},"scale":null}"#).unwrap();
    let b: Placement = serde_json::from_str(r#"{"sensorId":"S1","position":{"x":1.0,"y":2.0},"scale":0}"#).unwrap();
    assert_eq!(a.scale, 1.0);
    assert_eq!(b.scale, 1.0);
}

#[test]
fn placement_serializes_sensor_id_camel_case() {
    let json = serde_json::to_value(placed("S9", 1.0, 2.0)).unwrap();
    assert_eq!(json["sensorId"], "S9");
    assert_eq!(json["scale"], 1.0);
}

#[test]
fn placement_sanitized_clamps_scale_and_position() {
    let p = Placement { sensor_id: "S1".into(), position: pt(150.0, f64::NAN), scale: 9.0 }.sanitized();
    assert_eq!(p.position, pt(100.0, 0.0));
    assert_eq!(p.scale, 3.0);
}

// =============================================================
// Layout
// =============================================================

#[test]
fn layout_insert_rejects_duplicate_sensor() {
    let mut layout = Layout::new();
    assert!(layout.insert(placed("S1", 1.0, 1.0)));
    assert!(!layout.insert(placed("S1", 50.0, 50.0)));
    assert_eq!(layout.len(), 1);
    assert_eq!(layout.get("S1").unwrap().position, pt(1.0, 1.0));
}

#[test]
fn layout_from_placements_keeps_first_per_sensor_and_order() {
    let layout = Layout::from_placements(vec![placed("B", 1.0, 1.0), placed("A", 2.0, 2.0), placed("B", 3.0, 3.0)]);
    assert_eq!(ids(&layout), ["B", "A"]);
}

#[test]
fn layout_remove_returns_placement() {
    let mut layout = Layout::from_placements(vec![placed("A", 1.0, 1.0), placed("B", 2.0, 2.0)]);
    let removed = layout.remove("A").unwrap();
    assert_eq!(removed.sensor_id, "A");
    assert_eq!(ids(&layout), ["B"]);
    assert!(layout.remove("A").is_none());
}

#[test]
fn layout_serializes_as_plain_array() {
    let layout = Layout::from_placements(vec![placed("A", 1.0, 1.0)]);
    let json = serde_json::to_value(&layout).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["sensorId"], "A");
}

#[test]
fn layout_deserialize_drops_duplicates_and_clamps() {
    let raw = r#"[
        {"sensorId": "S1", "position": {"x": 150, "y": -20}, "scale": 9},
        {"sensorId": "S1", "position": {"x": 10, "y": 10}, "scale": 1},
        {"sensorId": "S2", "position": {"x": 30, "y": 40}}
    ]"#;
    let layout: Layout = serde_json::from_str(raw).unwrap();
    assert_eq!(ids(&layout), ["S1", "S2"]);
    let first = layout.get("S1").unwrap();
    assert_eq!(first.position, pt(100.0, 0.0));
    assert_eq!(first.scale, 3.0);
}

#[test]
fn layout_insert_sanitizes() {
    let mut layout = Layout::new();
    assert!(layout.insert(Placement { sensor_id: "S1".into(), position: pt(-5.0, 120.0), scale: 0.1 }));
    let p = layout.get("S1").unwrap();
    assert_eq!(p.position, pt(0.0, 100.0));
    assert_eq!(p.scale, 0.5);
}

// =============================================================
// LayoutEditor: sessions
// =============================================================

#[test]
fn editor_starts_not_editing() {
    let ed = editor_with(&["A"]);
    assert!(!ed.is_editing());
    assert!(ed.draft().is_none());
    assert_eq!(ids(ed.visible()), ["A"]);
}

#[test]
fn enter_edit_copies_committed() {
    let mut ed = editor_with(&["A", "B"]);
    assert!(!ed.enter_edit());
    assert_eq!(ed.draft().unwrap(), ed.committed());
}

#[test]
fn draft_mutation_does_not_touch_committed() {
    let mut ed = editor_with(&["A"]);
    ed.enter_edit();
    ed.draft_mut().unwrap().get_mut("A").unwrap().position = pt(90.0, 90.0);
    assert_eq!(ed.committed().get("A").unwrap().position, pt(10.0, 10.0));
    assert_eq!(ed.visible().get("A").unwrap().position, pt(90.0, 90.0));
}

#[test]
fn enter_edit_twice_discards_first_draft() {
    let mut ed = editor_with(&[]);
    ed.enter_edit();
    ed.add_placement("S1", pt(5.0, 5.0));
    assert!(ed.enter_edit());
    assert!(ed.draft().unwrap().is_empty());
}

#[test]
fn discard_then_enter_starts_from_committed() {
    let mut ed = editor_with(&["A"]);
    ed.enter_edit();
    ed.remove_placement("A");
    assert!(ed.discard());
    assert!(!ed.is_editing());
    ed.enter_edit();
    assert_eq!(ids(ed.draft().unwrap()), ["A"]);
}

#[test]
fn commit_replaces_committed_and_ends_session() {
    let mut ed = editor_with(&["A"]);
    ed.enter_edit();
    ed.add_placement("B", pt(20.0, 30.0));
    ed.remove_placement("A");
    assert!(ed.commit());
    assert!(!ed.is_editing());
    assert_eq!(ids(ed.committed()), ["B"]);
}

#[test]
fn commit_and_discard_without_session_are_noops() {
    let mut ed = editor_with(&["A"]);
    assert!(!ed.commit());
    assert!(!ed.discard());
    assert_eq!(ids(ed.committed()), ["A"]);
}

// =============================================================
// LayoutEditor: add / remove
// =============================================================

#[test]
fn add_placement_outside_edit_is_noop() {
    let mut ed = editor_with(&[]);
    assert!(!ed.add_placement("S1", pt(1.0, 1.0)));
    assert!(ed.committed().is_empty());
}

#[test]
fn add_placement_appends_with_default_scale() {
    let mut ed = editor_with(&["A"]);
    ed.enter_edit();
    assert!(ed.add_placement("S1", pt(40.0, 60.0)));
    let draft = ed.draft().unwrap();
    assert_eq!(ids(draft), ["A", "S1"]);
    assert_eq!(draft.get("S1").unwrap().scale, 1.0);
}

#[test]
fn add_placement_twice_is_noop() {
    let mut ed = editor_with(&[]);
    ed.enter_edit();
    assert!(ed.add_placement("S1", pt(40.0, 60.0)));
    assert!(!ed.add_placement("S1", pt(1.0, 1.0)));
    assert_eq!(ed.draft().unwrap().get("S1").unwrap().position, pt(40.0, 60.0));
}

#[test]
fn place_then_cancel_leaves_committed_empty() {
    let mut ed = editor_with(&[]);
    ed.enter_edit();
    ed.add_placement("S1", pt(40.0, 60.0));
    assert_eq!(ed.draft().unwrap().as_slice(), [placed("S1", 40.0, 60.0)]);
    ed.discard();
    assert!(ed.committed().is_empty());
}

#[test]
fn remove_placement_missing_returns_false() {
    let mut ed = editor_with(&["A"]);
    ed.enter_edit();
    assert!(!ed.remove_placement("Z"));
    assert!(ed.remove_placement("A"));
}

#[test]
fn load_drops_open_draft() {
    let mut ed = editor_with(&["A"]);
    ed.enter_edit();
    ed.load(Layout::from_placements(vec![placed("C", 1.0, 1.0)]));
    assert!(!ed.is_editing());
    assert_eq!(ids(ed.committed()), ["C"]);
}

#[test]
fn purge_sensor_removes_from_committed_and_draft() {
    let mut ed = editor_with(&["A", "B"]);
    ed.enter_edit();
    ed.purge_sensor("A");
    assert_eq!(ids(ed.committed()), ["B"]);
    assert_eq!(ids(ed.draft().unwrap()), ["B"]);
}
