use embedded_graphics::prelude::{Point, Size};

use super::*;
use crate::config::PatternLockConfig;
use crate::grid::DotId;

const AREA: Size = Size::new(300, 300);

fn at(row: i32, column: i32) -> Point {
    Point::new(column * 100 + 50, row * 100 + 50)
}

fn engine() -> PatternLockEngine {
    let mut engine = PatternLockEngine::new(PatternLockConfig::default()).expect("config");
    engine.layout(AREA);
    engine
}

fn labels(output: &PatternOutput) -> std::vec::Vec<&'static str> {
    output.states.iter().map(PatternViewState::label).collect()
}

/// Draws one gesture through `cells` starting at `start_ms`, 10 ms per step.
fn gesture(engine: &mut PatternLockEngine, start_ms: u64, cells: &[(i32, i32)]) -> PatternOutput {
    let mut now = start_ms;
    let mut first = true;
    for &(row, column) in cells {
        if first {
            engine.pointer_down(now, at(row, column));
            first = false;
        } else {
            engine.pointer_move(now, at(row, column));
        }
        now += 10;
    }
    engine.pointer_up(now)
}

const TOP_ROW_THEN_RIGHT: [(i32, i32); 4] = [(0, 0), (0, 1), (0, 2), (1, 2)];

#[test]
fn first_stage_capture_succeeds_and_stores_signature() {
    let mut engine = engine();
    let output = gesture(&mut engine, 0, &TOP_ROW_THEN_RIGHT);

    assert!(output.last_state().is_some_and(|s| s.is_success()));
    assert_eq!(engine.stage(), PatternViewStageState::First);
    assert_eq!(
        engine
            .stage_passwords()
            .get(PatternViewStageState::First)
            .map(Signature::as_str),
        Some("1236")
    );
}

#[test]
fn identical_confirmation_succeeds() {
    let mut engine = engine();
    gesture(&mut engine, 0, &TOP_ROW_THEN_RIGHT);
    let advanced = engine.advance_stage().expect("advance");
    assert_eq!(labels(&advanced), ["initial"]);
    assert_eq!(engine.stage(), PatternViewStageState::Second);
    assert!(engine.marked().is_empty());

    let output = gesture(&mut engine, 500, &TOP_ROW_THEN_RIGHT);
    assert_eq!(labels(&output), ["success"]);
    assert_eq!(
        output.last_state(),
        Some(PatternViewState::success(&engine.config().palette))
    );
}

#[test]
fn differing_confirmation_is_a_mismatch() {
    let mut engine = engine();
    gesture(&mut engine, 0, &TOP_ROW_THEN_RIGHT);
    engine.advance_stage().expect("advance");

    let output = gesture(&mut engine, 500, &[(0, 0), (0, 1), (1, 1), (2, 2)]);
    assert_eq!(
        output.last_state(),
        Some(PatternViewState::error(&engine.config().palette))
    );
    assert_eq!(engine.reset_deadline_ms(), Some(540 + 1_000));
}

#[test]
fn too_short_gesture_errors_then_recovers_after_delay() {
    let mut engine = engine();
    let output = gesture(&mut engine, 0, &[(0, 0), (0, 1), (1, 1)]);
    assert_eq!(labels(&output), ["error"]);
    assert_eq!(engine.signature().as_str(), "125");

    let released_at = 30;
    assert!(!engine.tick(released_at + 999).emitted());
    assert!(engine.state().is_error());

    let recovered = engine.tick(released_at + 1_000);
    assert_eq!(labels(&recovered), ["initial"]);
    assert!(engine.marked().is_empty());
    assert!(engine.dots().iter().all(|dot| !dot.touched));
    assert_eq!(engine.reset_deadline_ms(), None);
    assert!(!engine.tick(released_at + 5_000).emitted());
}

#[test]
fn release_without_any_dot_is_silent() {
    let mut engine = engine();
    let down = engine.pointer_down(0, Point::new(100, 100));
    let up = engine.pointer_up(20);

    assert!(!down.emitted());
    assert!(!up.emitted());
    assert_eq!(engine.state(), PatternViewState::Initial);
}

#[test]
fn started_is_emitted_once_per_gesture() {
    let mut engine = engine();
    let down = engine.pointer_down(0, at(0, 0));
    assert_eq!(labels(&down), ["started"]);

    let moved = engine.pointer_move(10, at(1, 1));
    assert!(!moved.emitted());
    assert!(moved.redraw);
    assert_eq!(engine.marked(), &[DotId::new(0, 0), DotId::new(1, 1)]);
}

#[test]
fn moving_back_over_a_marked_dot_does_not_repeat_it() {
    let mut engine = engine();
    engine.pointer_down(0, at(0, 0));
    engine.pointer_move(10, at(0, 1));
    engine.pointer_move(20, at(0, 0));
    engine.pointer_move(30, at(0, 1));
    assert_eq!(engine.marked(), &[DotId::new(0, 0), DotId::new(0, 1)]);
}

#[test]
fn exactly_min_dots_is_structurally_valid() {
    let mut engine = engine();
    let output = gesture(&mut engine, 0, &[(2, 0), (1, 0), (0, 0), (0, 1)]);
    assert_eq!(labels(&output), ["success"]);
}

#[test]
fn reaching_max_dots_halts_acquisition() {
    let config = PatternLockConfig::default().with_dot_limits(2, 3);
    let mut engine = PatternLockEngine::new(config).expect("config");
    engine.layout(AREA);

    let output = gesture(&mut engine, 0, &[(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]);
    assert_eq!(labels(&output), ["success"]);
    assert_eq!(engine.signature().as_str(), "123");
    assert!(!engine.dots()[DotId::new(1, 2).index(3)].touched);
}

#[test]
fn new_gesture_in_error_cancels_pending_reset() {
    let mut engine = engine();
    gesture(&mut engine, 0, &[(0, 0), (0, 1)]);
    assert!(engine.reset_deadline_ms().is_some());

    let down = engine.pointer_down(400, at(2, 2));
    assert_eq!(labels(&down), ["started"]);
    assert_eq!(engine.reset_deadline_ms(), None);
    assert_eq!(engine.marked(), &[DotId::new(2, 2)]);

    assert!(!engine.tick(2_000).emitted());
    assert_eq!(engine.state(), PatternViewState::Started);
}

#[test]
fn missed_touch_in_error_resets_to_initial() {
    let mut engine = engine();
    gesture(&mut engine, 0, &[(0, 0)]);
    let down = engine.pointer_down(100, Point::new(100, 100));
    assert_eq!(labels(&down), ["initial"]);
    assert_eq!(engine.reset_deadline_ms(), None);
}

#[test]
fn success_ignores_new_gestures_until_reset() {
    let mut engine = engine();
    gesture(&mut engine, 0, &TOP_ROW_THEN_RIGHT);

    let ignored = engine.pointer_down(100, at(2, 2));
    assert!(!ignored.emitted());
    assert!(engine.state().is_success());
    assert_eq!(engine.signature().as_str(), "1236");

    assert_eq!(labels(&engine.reset()), ["initial"]);
    assert_eq!(labels(&engine.pointer_down(200, at(2, 2))), ["started"]);
}

#[test]
fn reset_keeps_the_stage() {
    let mut engine = engine();
    gesture(&mut engine, 0, &TOP_ROW_THEN_RIGHT);
    engine.advance_stage().expect("advance");
    gesture(&mut engine, 100, &[(0, 0), (1, 1)]);
    engine.reset();
    assert_eq!(engine.stage(), PatternViewStageState::Second);
}

#[test]
fn advance_is_rejected_without_capture_or_twice() {
    let mut engine = engine();
    assert_eq!(engine.advance_stage(), Err(StageError::NoFirstCapture));

    gesture(&mut engine, 0, &TOP_ROW_THEN_RIGHT);
    assert!(engine.advance_stage().is_ok());
    assert_eq!(engine.advance_stage(), Err(StageError::NotInFirstStage));
    assert_eq!(engine.stage(), PatternViewStageState::Second);
}

#[test]
fn too_short_first_gesture_records_nothing() {
    let mut engine = engine();
    gesture(&mut engine, 0, &[(0, 0), (0, 1)]);
    assert_eq!(engine.advance_stage(), Err(StageError::NoFirstCapture));
}

#[test]
fn mismatch_recovery_stays_in_confirmation_stage() {
    let mut engine = engine();
    gesture(&mut engine, 0, &TOP_ROW_THEN_RIGHT);
    engine.advance_stage().expect("advance");
    gesture(&mut engine, 100, &[(2, 2), (2, 1), (2, 0), (1, 0)]);

    let recovered = engine.tick(10_000);
    assert_eq!(labels(&recovered), ["initial"]);
    assert_eq!(engine.stage(), PatternViewStageState::Second);
    assert_eq!(
        engine
            .stage_passwords()
            .get(PatternViewStageState::First)
            .map(Signature::as_str),
        Some("1236")
    );

    let retry = gesture(&mut engine, 20_000, &TOP_ROW_THEN_RIGHT);
    assert_eq!(labels(&retry), ["success"]);
}

#[test]
fn restart_returns_to_first_stage_with_empty_table() {
    let mut engine = engine();
    gesture(&mut engine, 0, &TOP_ROW_THEN_RIGHT);
    engine.advance_stage().expect("advance");

    assert_eq!(labels(&engine.restart()), ["initial"]);
    assert_eq!(engine.stage(), PatternViewStageState::First);
    assert_eq!(engine.stage_passwords(), &StagePasswords::default());
}

#[test]
fn dispatch_to_forwards_states_in_order() {
    let mut engine = engine();
    let mut seen = std::vec::Vec::new();
    let mut sink = |state: PatternViewState| seen.push(state.label());

    engine.dispatch_to(&mut sink, |e| e.pointer_down(0, at(0, 0)));
    engine.dispatch_to(&mut sink, |e| e.pointer_up(10));
    engine.dispatch_to(&mut sink, |e| e.tick(1_010));

    assert_eq!(seen, ["started", "error", "initial"]);
}

#[test]
fn relayout_mid_gesture_keeps_marks() {
    let mut engine = engine();
    engine.pointer_down(0, at(0, 0));
    engine.pointer_move(10, at(0, 1));

    let output = engine.layout(Size::new(600, 600));
    assert!(output.redraw);
    assert_eq!(engine.marked().len(), 2);
    assert_eq!(engine.dots()[0].center, Point::new(100, 100));

    engine.pointer_move(20, Point::new(500, 100));
    assert_eq!(engine.signature().as_str(), "123");
}

#[test]
fn collapsed_surface_mid_gesture_keeps_marked_dots_touched() {
    let mut engine = engine();
    engine.pointer_down(0, at(0, 0));
    engine.pointer_move(10, at(0, 1));

    assert!(!engine.layout(Size::new(1, 1)).redraw);
    engine.layout(AREA);

    assert_eq!(engine.marked(), &[DotId::new(0, 0), DotId::new(0, 1)]);
    let touched: std::vec::Vec<DotId> = engine
        .dots()
        .iter()
        .filter(|dot| dot.touched)
        .map(|dot| dot.id)
        .collect();
    assert_eq!(touched, engine.marked());

    engine.pointer_move(20, at(0, 2));
    assert_eq!(engine.signature().as_str(), "123");
}

#[test]
fn gestures_before_layout_hit_nothing() {
    let mut engine = PatternLockEngine::with_defaults();
    assert!(!engine.pointer_down(0, at(0, 0)).emitted());
    assert!(engine.marked().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = PatternLockConfig::default().with_dot_limits(0, 4);
    assert!(PatternLockEngine::new(config).is_err());
}
