//! Cooperative animation tasks.
//!
//! A task is advanced once per frame by the [`Scheduler`](crate::Scheduler) with the elapsed
//! time in seconds and reports whether it still needs frames. Tasks compose through
//! [`all`], [`sequence`] and [`delay`]; cancelling a task means dropping it.

use std::collections::VecDeque;

use crate::animation::ease::Ease;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Done,
}

pub trait Task {
    /// Advance by `dt` seconds.
    fn advance(&mut self, dt: f64) -> TaskStatus;
}

pub type BoxTask = Box<dyn Task>;

/// Slack on time comparisons, so frame steps summing to a duration land on it.
const TIME_EPSILON: f64 = 1e-9;

impl<T: Task + ?Sized> Task for Box<T> {
    fn advance(&mut self, dt: f64) -> TaskStatus {
        (**self).advance(dt)
    }
}

/// Time-bounded interpolation driving an update callback with eased progress.
pub struct Tween {
    duration: f64,
    elapsed: f64,
    ease: Ease,
    update: Box<dyn FnMut(f64)>,
    finish: Option<Box<dyn FnOnce()>>,
    cleanup: Option<Box<dyn FnOnce()>>,
    done: bool,
}

impl Tween {
    pub fn new(duration: f64, ease: Ease, update: impl FnMut(f64) + 'static) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease,
            update: Box::new(update),
            finish: None,
            cleanup: None,
            done: false,
        }
    }

    /// Runs once, right after the final update, only if the tween completes.
    pub fn on_finish(mut self, f: impl FnOnce() + 'static) -> Self {
        self.finish = Some(Box::new(f));
        self
    }

    /// Runs once when the tween completes or is dropped early.
    pub fn on_cleanup(mut self, f: impl FnOnce() + 'static) -> Self {
        self.cleanup = Some(Box::new(f));
        self
    }

    pub fn boxed(self) -> BoxTask {
        Box::new(self)
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    fn complete(&mut self) {
        self.done = true;
        if let Some(f) = self.finish.take() {
            f();
        }
        if let Some(f) = self.cleanup.take() {
            f();
        }
    }
}

impl Task for Tween {
    fn advance(&mut self, dt: f64) -> TaskStatus {
        if self.done {
            return TaskStatus::Done;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed + TIME_EPSILON >= self.duration {
            (self.update)(self.ease.apply(1.0));
            self.complete();
            return TaskStatus::Done;
        }
        (self.update)(self.ease.apply(self.elapsed / self.duration));
        TaskStatus::Pending
    }
}

impl Drop for Tween {
    fn drop(&mut self) {
        if let Some(f) = self.cleanup.take() {
            f();
        }
    }
}

/// Runs every task each frame until all of them are done.
pub struct All {
    tasks: Vec<Option<BoxTask>>,
}

pub fn all(tasks: impl IntoIterator<Item = BoxTask>) -> All {
    All {
        tasks: tasks.into_iter().map(Some).collect(),
    }
}

impl Task for All {
    fn advance(&mut self, dt: f64) -> TaskStatus {
        let mut pending = false;
        for slot in &mut self.tasks {
            if let Some(task) = slot {
                if task.advance(dt) == TaskStatus::Done {
                    *slot = None;
                } else {
                    pending = true;
                }
            }
        }
        if pending {
            TaskStatus::Pending
        } else {
            TaskStatus::Done
        }
    }
}

/// Runs tasks one after another; the next task starts in the frame the previous one ends.
pub struct Sequence {
    tasks: VecDeque<BoxTask>,
}

pub fn sequence(tasks: impl IntoIterator<Item = BoxTask>) -> Sequence {
    Sequence {
        tasks: tasks.into_iter().collect(),
    }
}

impl Task for Sequence {
    fn advance(&mut self, dt: f64) -> TaskStatus {
        let mut dt = dt;
        while let Some(front) = self.tasks.front_mut() {
            if front.advance(dt) == TaskStatus::Pending {
                return TaskStatus::Pending;
            }
            self.tasks.pop_front();
            dt = 0.0;
        }
        TaskStatus::Done
    }
}

pub struct Delay {
    remaining: f64,
    inner: BoxTask,
}

/// Start `task` after `secs` seconds. Time left over in the frame the delay expires is
/// forwarded to the inner task.
pub fn delay(secs: f64, task: BoxTask) -> Delay {
    Delay {
        remaining: secs.max(0.0),
        inner: task,
    }
}

impl Task for Delay {
    fn advance(&mut self, dt: f64) -> TaskStatus {
        if self.remaining > 0.0 {
            self.remaining -= dt;
            if self.remaining > TIME_EPSILON {
                return TaskStatus::Pending;
            }
            let carry = (-self.remaining).max(0.0);
            self.remaining = 0.0;
            return self.inner.advance(carry);
        }
        self.inner.advance(dt)
    }
}

pub struct Wait {
    remaining: f64,
}

pub fn wait(secs: f64) -> Wait {
    Wait { remaining: secs }
}

impl Task for Wait {
    fn advance(&mut self, dt: f64) -> TaskStatus {
        self.remaining -= dt;
        if self.remaining > TIME_EPSILON {
            TaskStatus::Pending
        } else {
            TaskStatus::Done
        }
    }
}

/// One-shot closure executed on the first advance.
pub struct Run {
    f: Option<Box<dyn FnOnce()>>,
}

pub fn run(f: impl FnOnce() + 'static) -> Run {
    Run {
        f: Some(Box::new(f)),
    }
}

impl Task for Run {
    fn advance(&mut self, _dt: f64) -> TaskStatus {
        if let Some(f) = self.f.take() {
            f();
        }
        TaskStatus::Done
    }
}

/// Builds its task on the first advance, so the setup sees the state earlier tasks left behind.
pub struct Deferred {
    build: Option<Box<dyn FnOnce() -> BoxTask>>,
    task: Option<BoxTask>,
}

pub fn deferred(build: impl FnOnce() -> BoxTask + 'static) -> Deferred {
    Deferred {
        build: Some(Box::new(build)),
        task: None,
    }
}

impl Task for Deferred {
    fn advance(&mut self, dt: f64) -> TaskStatus {
        if let Some(build) = self.build.take() {
            self.task = Some(build());
        }
        match self.task.as_mut() {
            Some(task) => task.advance(dt),
            None => TaskStatus::Done,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/task.rs"]
mod tests;
