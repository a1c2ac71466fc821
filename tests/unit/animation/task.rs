use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;

fn recorder() -> (Rc<RefCell<Vec<f64>>>, impl FnMut(f64) + 'static) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    (log, move |t| sink.borrow_mut().push(t))
}

#[test]
fn tween_reports_eased_progress_and_finishes_once() {
    let (log, update) = recorder();
    let finished = Rc::new(Cell::new(0));
    let f = finished.clone();
    let mut tween = Tween::new(1.0, Ease::Linear, update).on_finish(move || f.set(f.get() + 1));

    assert_eq!(tween.advance(0.25), TaskStatus::Pending);
    assert_eq!(tween.advance(0.25), TaskStatus::Pending);
    assert_eq!(tween.advance(0.75), TaskStatus::Done);
    assert_eq!(tween.advance(0.1), TaskStatus::Done);
    assert_eq!(*log.borrow(), vec![0.25, 0.5, 1.0]);
    assert_eq!(finished.get(), 1);
}

#[test]
fn frame_steps_summing_to_the_duration_finish_on_the_last_frame() {
    for fps in [10_u32, 24, 60, 120, 144] {
        let dt = 1.0 / f64::from(fps);
        let mut tween = Tween::new(1.0, Ease::Linear, |_| {});
        let mut waiting = wait(1.0);
        for frame in 1..fps {
            assert_eq!(tween.advance(dt), TaskStatus::Pending, "{fps} fps, frame {frame}");
            assert_eq!(waiting.advance(dt), TaskStatus::Pending, "{fps} fps, frame {frame}");
        }
        assert_eq!(tween.advance(dt), TaskStatus::Done, "{fps} fps");
        assert_eq!(waiting.advance(dt), TaskStatus::Done, "{fps} fps");
    }
}

#[test]
fn dropping_a_tween_runs_cleanup_but_not_finish() {
    let finished = Rc::new(Cell::new(false));
    let cleaned = Rc::new(Cell::new(false));
    {
        let f = finished.clone();
        let c = cleaned.clone();
        let mut tween = Tween::new(1.0, Ease::Linear, |_| {})
            .on_finish(move || f.set(true))
            .on_cleanup(move || c.set(true));
        tween.advance(0.1);
    }
    assert!(!finished.get());
    assert!(cleaned.get());
}

#[test]
fn all_waits_for_longest() {
    let mut task = all([
        Tween::new(0.5, Ease::Linear, |_| {}).boxed(),
        Tween::new(1.0, Ease::Linear, |_| {}).boxed(),
    ]);
    assert_eq!(task.advance(0.5), TaskStatus::Pending);
    assert_eq!(task.advance(0.5), TaskStatus::Done);
    assert_eq!(all(Vec::new()).advance(0.0), TaskStatus::Done);
}

#[test]
fn sequence_starts_next_in_same_frame() {
    let (log, update) = recorder();
    let mut task = sequence([
        Box::new(wait(0.5)) as BoxTask,
        Tween::new(1.0, Ease::Linear, update).boxed(),
    ]);
    assert_eq!(task.advance(0.5), TaskStatus::Pending);
    assert_eq!(*log.borrow(), vec![0.0]);
    assert_eq!(task.advance(1.0), TaskStatus::Done);
    assert_eq!(*log.borrow(), vec![0.0, 1.0]);
}

#[test]
fn delay_forwards_leftover_time() {
    let (log, update) = recorder();
    let mut task = delay(0.3, Tween::new(1.0, Ease::Linear, update).boxed());
    assert_eq!(task.advance(0.2), TaskStatus::Pending);
    assert!(log.borrow().is_empty());
    assert_eq!(task.advance(0.2), TaskStatus::Pending);
    let first = log.borrow()[0];
    assert!((first - 0.1).abs() < 1e-9);
}

#[test]
fn run_executes_once() {
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let mut task = run(move || h.set(h.get() + 1));
    assert_eq!(task.advance(0.0), TaskStatus::Done);
    assert_eq!(task.advance(0.0), TaskStatus::Done);
    assert_eq!(hits.get(), 1);
}

#[test]
fn deferred_builds_on_first_advance() {
    let state = Rc::new(Cell::new(1.0));
    let reader = state.clone();
    let seen = Rc::new(Cell::new(0.0));
    let out = seen.clone();
    let mut task = deferred(move || {
        out.set(reader.get());
        Box::new(wait(0.5))
    });
    state.set(7.0);
    assert_eq!(seen.get(), 0.0);
    assert_eq!(task.advance(0.25), TaskStatus::Pending);
    assert_eq!(seen.get(), 7.0);
    assert_eq!(task.advance(0.25), TaskStatus::Done);
}
