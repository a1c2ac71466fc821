use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::animation::task::{Task, TaskStatus};

#[test]
fn plain_signal_get_set_reset() {
    let s = Signal::new(1.0);
    assert!(s.is_initial());
    assert_eq!(s.get(), 1.0);
    s.set(2.5);
    assert!(!s.is_initial());
    assert_eq!(s.get(), 2.5);
    s.reset();
    assert!(s.is_initial());
    assert_eq!(s.get(), 1.0);
}

#[test]
fn parser_applies_to_every_value() {
    let s = Signal::with_parser(0.5, |v: f64| v.clamp(0.0, 1.0));
    s.set(3.0);
    assert_eq!(s.get(), 1.0);
    s.set(SignalValue::reactive(|| -2.0));
    assert_eq!(s.get(), 0.0);
}

#[test]
fn computed_recomputes_once_per_invalidation() {
    let source = Signal::new(2.0);
    let runs = Rc::new(Cell::new(0));
    let derived = {
        let source = source.clone();
        let runs = runs.clone();
        Computed::new(move || {
            runs.set(runs.get() + 1);
            source.get() * 10.0
        })
    };

    assert_eq!(derived.get(), 20.0);
    assert_eq!(derived.get(), 20.0);
    assert_eq!(runs.get(), 1);

    source.set(3.0);
    source.set(4.0);
    assert_eq!(runs.get(), 1, "invalidation must not recompute eagerly");
    assert_eq!(derived.get(), 40.0);
    assert_eq!(derived.get(), 40.0);
    assert_eq!(runs.get(), 2);
}

#[test]
fn invalidation_propagates_through_chains() {
    let a = Signal::new(1.0);
    let b = {
        let a = a.clone();
        Computed::new(move || a.get() + 1.0)
    };
    let c = {
        let b = b.clone();
        Computed::new(move || b.get() * 2.0)
    };
    assert_eq!(c.get(), 4.0);
    a.set(5.0);
    assert_eq!(c.get(), 12.0);
}

#[test]
fn untracked_reads_do_not_subscribe() {
    let a = Signal::new(1.0);
    let runs = Rc::new(Cell::new(0));
    let d = {
        let a = a.clone();
        let runs = runs.clone();
        Computed::new(move || {
            runs.set(runs.get() + 1);
            a.peek()
        })
    };
    assert_eq!(d.get(), 1.0);
    a.set(7.0);
    assert_eq!(d.get(), 1.0);
    assert_eq!(runs.get(), 1);
    assert_eq!(a.dependent_count(), 0);
}

#[test]
fn dispose_freezes_reactive_value_and_drops_subscribers() {
    let a = Signal::new(1.0);
    let follower = {
        let a = a.clone();
        Signal::reactive(move || a.get() * 3.0)
    };
    assert_eq!(follower.get(), 3.0);
    follower.dispose();
    assert!(!follower.is_reactive());
    a.set(2.0);
    assert_eq!(follower.get(), 3.0);
}

#[test]
fn tween_reaches_target_and_keeps_reactive_target() {
    let s = Signal::new(0.0);
    let goal = Signal::new(10.0);
    let mut task = {
        let goal = goal.clone();
        s.tween(SignalValue::reactive(move || goal.get()), 1.0, Ease::Linear)
    };
    assert_eq!(task.advance(0.5), TaskStatus::Pending);
    assert!((s.get() - 5.0).abs() < 1e-9);
    assert_eq!(task.advance(0.5), TaskStatus::Done);
    assert_eq!(s.get(), 10.0);
    assert!(s.is_reactive());
    goal.set(20.0);
    assert_eq!(s.get(), 20.0);
}
