#![allow(clippy::float_cmp)]

use super::*;
use crate::input::{PointerKind, Session};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn rect() -> MapRect {
    MapRect::new(0.0, 0.0, 400.0, 300.0)
}

fn down(x: f64, y: f64, t: f64) -> PointerInput {
    PointerInput::primary(pt(x, y), t)
}

fn session(x: f64, y: f64, t: f64) -> Session {
    Session::start(&down(x, y, t), rect())
}

fn dragging(id: &str, at: Point, scale: f64) -> InputState {
    InputState::DraggingIndicator {
        session: session(100.0, 100.0, 0.0),
        id: id.into(),
        start: Placement { sensor_id: id.into(), position: at, scale },
    }
}

fn resizing(id: &str, scale: f64) -> InputState {
    InputState::ResizingIndicator {
        session: session(100.0, 100.0, 0.0),
        id: id.into(),
        start: Placement { sensor_id: id.into(), position: pt(50.0, 50.0), scale },
    }
}

fn cfg() -> InteractionConfig {
    InteractionConfig::default()
}

// =============================================================
// pan_for_delta
// =============================================================

#[test]
fn pan_adds_delta_to_start() {
    let p = pan_for_delta(pt(-50.0, -30.0), pt(-20.0, 10.0), 2.0, &rect());
    assert_eq!(p, pt(-70.0, -20.0));
}

#[test]
fn pan_is_clamped_to_map_edges() {
    let p = pan_for_delta(pt(-50.0, -30.0), pt(500.0, -1000.0), 2.0, &rect());
    assert_eq!(p, pt(0.0, -300.0));
}

#[test]
fn pan_at_native_zoom_stays_at_origin() {
    assert_eq!(pan_for_delta(Point::zero(), pt(-40.0, -40.0), 1.0, &rect()), Point::zero());
}

// =============================================================
// drag_position
// =============================================================

#[test]
fn drag_scenario_zoom_two() {
    let start = Placement::new("S1", pt(50.0, 50.0));
    let p = drag_position(&start, pt(20.0, 0.0), &rect(), 2.0);
    assert!(approx_eq(p.x, 52.5));
    assert!(approx_eq(p.y, 50.0));
}

#[test]
fn drag_formula_matches_for_several_zooms() {
    let start = Placement::new("S1", pt(30.0, 40.0));
    for zoom in [0.5, 1.0, 1.75, 4.0] {
        let (dx, dy) = (24.0, -18.0);
        let p = drag_position(&start, pt(dx, dy), &rect(), zoom);
        assert!(approx_eq(p.x, 30.0 + dx / zoom / 400.0 * 100.0), "zoom {zoom}");
        assert!(approx_eq(p.y, 40.0 + dy / zoom / 300.0 * 100.0), "zoom {zoom}");
    }
}

#[test]
fn drag_clamps_axes_independently() {
    let start = Placement::new("S1", pt(95.0, 5.0));
    let p = drag_position(&start, pt(400.0, 6.0), &rect(), 1.0);
    assert_eq!(p.x, 100.0);
    assert!(approx_eq(p.y, 7.0));

    let q = drag_position(&start, pt(4.0, -400.0), &rect(), 1.0);
    assert!(approx_eq(q.x, 96.0));
    assert_eq!(q.y, 0.0);
}

// =============================================================
// resize_scale
// =============================================================

#[test]
fn resize_uses_diagonal_sum_over_sensitivity() {
    assert!(approx_eq(resize_scale(1.0, pt(30.0, 20.0), 200.0), 1.25));
    assert!(approx_eq(resize_scale(1.0, pt(-30.0, -20.0), 200.0), 0.75));
    assert!(approx_eq(resize_scale(1.0, pt(50.0, -50.0), 200.0), 1.0));
}

#[test]
fn resize_is_clamped() {
    assert_eq!(resize_scale(1.0, pt(1000.0, 1000.0), 200.0), 3.0);
    assert_eq!(resize_scale(1.0, pt(-1000.0, 0.0), 200.0), 0.5);
}

#[test]
fn resize_is_monotonic_in_diagonal_sum() {
    let mut last = f64::NEG_INFINITY;
    let mut sum = -90.0;
    while sum <= 300.0 {
        let s = resize_scale(1.0, pt(sum, 0.0), 200.0);
        assert!(s >= last);
        last = s;
        sum += 7.5;
    }
}

#[test]
fn resize_respects_custom_sensitivity() {
    assert!(approx_eq(resize_scale(1.0, pt(50.0, 50.0), 100.0), 2.0));
}

// =============================================================
// on_move
// =============================================================

#[test]
fn on_move_idle_is_none() {
    let mut state = InputState::Idle;
    assert!(on_move(&mut state, &down(5.0, 5.0, 1.0), 1.0, &cfg()).is_none());
    assert!(state.is_idle());
}

#[test]
fn on_move_marks_session_moved() {
    let mut state = dragging("S1", pt(50.0, 50.0), 1.0);
    on_move(&mut state, &down(100.0, 100.0, 5.0), 1.0, &cfg());
    assert!(state.session().unwrap().moved);
}

#[test]
fn on_move_pan_effect() {
    let mut state = InputState::Panning { session: session(100.0, 100.0, 0.0), start_pan: pt(-50.0, -30.0) };
    let effect = on_move(&mut state, &down(80.0, 110.0, 5.0), 2.0, &cfg());
    assert_eq!(effect, Some(MoveEffect::Pan(pt(-70.0, -20.0))));
}

#[test]
fn on_move_drag_effect_uses_start_not_previous() {
    let mut state = dragging("S1", pt(50.0, 50.0), 1.0);
    on_move(&mut state, &down(180.0, 100.0, 5.0), 2.0, &cfg());
    let effect = on_move(&mut state, &down(120.0, 100.0, 9.0), 2.0, &cfg());
    match effect {
        Some(MoveEffect::Position { id, position }) => {
            assert_eq!(id, "S1");
            assert!(approx_eq(position.x, 52.5));
            assert!(approx_eq(position.y, 50.0));
        }
        other => panic!("unexpected effect {other:?}"),
    }
}

#[test]
fn on_move_resize_effect() {
    let mut state = resizing("S2", 1.5);
    let effect = on_move(&mut state, &down(140.0, 120.0, 5.0), 1.0, &cfg());
    match effect {
        Some(MoveEffect::Scale { id, scale }) => {
            assert_eq!(id, "S2");
            assert!(approx_eq(scale, 1.8));
        }
        other => panic!("unexpected effect {other:?}"),
    }
}

// =============================================================
// finish
// =============================================================

#[test]
fn finish_idle_is_idle() {
    let mut state = InputState::Idle;
    assert_eq!(finish(&mut state, 10.0, EndReason::PointerUp, &cfg()), Release::Idle);
}

#[test]
fn quick_still_drag_is_click() {
    let mut state = dragging("S1", pt(50.0, 50.0), 1.0);
    assert_eq!(finish(&mut state, 299.0, EndReason::PointerUp, &cfg()), Release::Click("S1".into()));
    assert!(state.is_idle());
}

#[test]
fn slow_still_drag_is_not_click() {
    let mut state = dragging("S1", pt(50.0, 50.0), 1.0);
    assert_eq!(finish(&mut state, 300.0, EndReason::PointerUp, &cfg()), Release::Finished);
}

#[test]
fn moved_drag_is_never_click() {
    let mut state = dragging("S1", pt(50.0, 50.0), 1.0);
    on_move(&mut state, &down(100.0, 100.0, 1.0), 1.0, &cfg());
    assert_eq!(finish(&mut state, 2.0, EndReason::PointerUp, &cfg()), Release::Finished);
}

#[test]
fn cancelled_drag_is_never_click() {
    let mut state = dragging("S1", pt(50.0, 50.0), 1.0);
    assert_eq!(finish(&mut state, 10.0, EndReason::Cancelled, &cfg()), Release::Finished);
    assert!(state.is_idle());
}

#[test]
fn still_resize_and_pan_are_not_clicks() {
    let mut resize = resizing("S1", 1.0);
    assert_eq!(finish(&mut resize, 10.0, EndReason::PointerUp, &cfg()), Release::Finished);
    let mut pan = InputState::Panning { session: session(0.0, 0.0, 0.0), start_pan: Point::zero() };
    assert_eq!(finish(&mut pan, 10.0, EndReason::PointerUp, &cfg()), Release::Finished);
}

#[test]
fn touch_threshold_override_applies() {
    let config = InteractionConfig { touch_click_max_duration_ms: Some(500.0), ..Default::default() };
    let mut state = InputState::DraggingIndicator {
        session: Session::start(&down(0.0, 0.0, 0.0).with_kind(PointerKind::Touch), rect()),
        id: "S1".into(),
        start: Placement::new("S1", pt(10.0, 10.0)),
    };
    assert_eq!(finish(&mut state, 450.0, EndReason::PointerUp, &config), Release::Click("S1".into()));
}
