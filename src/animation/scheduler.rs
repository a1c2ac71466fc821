use crate::animation::task::{BoxTask, Task, TaskStatus};
use crate::foundation::core::Fps;

/// Single-threaded frame driver: every [`Scheduler::tick`] advances each live task once.
pub struct Scheduler {
    fps: Fps,
    frame: u64,
    tasks: Vec<BoxTask>,
}

impl Scheduler {
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            frame: 0,
            tasks: Vec::new(),
        }
    }

    pub fn spawn(&mut self, task: impl Task + 'static) {
        self.tasks.push(Box::new(task));
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time(&self) -> f64 {
        self.fps.frames_to_secs(self.frame)
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance one frame. Returns the number of tasks still pending.
    pub fn tick(&mut self) -> usize {
        let dt = self.fps.frame_duration_secs();
        self.frame += 1;
        self.tasks
            .retain_mut(|task| task.advance(dt) == TaskStatus::Pending);
        tracing::trace!(frame = self.frame, pending = self.tasks.len(), "scheduler tick");
        self.tasks.len()
    }

    /// Tick until idle or until `max_frames` frames have elapsed. Returns frames ticked.
    pub fn run_until_idle(&mut self, max_frames: u64) -> u64 {
        let mut n = 0;
        while !self.is_idle() && n < max_frames {
            self.tick();
            n += 1;
        }
        n
    }

    /// Drop every pending task, running their cleanup callbacks.
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scheduler.rs"]
mod tests;
