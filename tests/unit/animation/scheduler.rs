use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::animation::ease::Ease;
use crate::animation::task::Tween;

#[test]
fn ticks_until_tasks_complete() {
    let mut scheduler = Scheduler::new(Fps::new(4, 1).unwrap());
    let value = Rc::new(Cell::new(0.0));
    let v = value.clone();
    scheduler.spawn(Tween::new(1.0, Ease::Linear, move |t| v.set(t)));

    assert_eq!(scheduler.tick(), 1);
    assert_eq!(value.get(), 0.25);
    let frames = scheduler.run_until_idle(100);
    assert_eq!(frames, 3);
    assert_eq!(value.get(), 1.0);
    assert_eq!(scheduler.frame(), 4);
    assert_eq!(scheduler.time(), 1.0);
}

#[test]
fn cancel_runs_cleanup() {
    let mut scheduler = Scheduler::new(Fps::default());
    let cleaned = Rc::new(Cell::new(false));
    let c = cleaned.clone();
    scheduler.spawn(Tween::new(10.0, Ease::Linear, |_| {}).on_cleanup(move || c.set(true)));
    scheduler.tick();
    scheduler.cancel_all();
    assert!(cleaned.get());
    assert!(scheduler.is_idle());
}
