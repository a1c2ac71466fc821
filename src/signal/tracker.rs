//! Dependency tracking for signals.
//!
//! Every reactive computation runs with itself pushed onto a thread-local observer stack; any
//! signal read while it is on top records the observer as a dependent. Writes invalidate
//! dependents transitively (push), and values are recomputed on the next read (pull).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub(crate) trait Invalidate {
    fn invalidate(&self);
}

thread_local! {
    static OBSERVERS: RefCell<Vec<Option<Weak<dyn Invalidate>>>> = const { RefCell::new(Vec::new()) };
}

struct ObserverGuard;

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        OBSERVERS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) fn observe<R>(observer: Option<Weak<dyn Invalidate>>, f: impl FnOnce() -> R) -> R {
    OBSERVERS.with(|stack| stack.borrow_mut().push(observer));
    let _guard = ObserverGuard;
    f()
}

/// Run `f` without subscribing the current computation to anything it reads.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    observe(None, f)
}

#[derive(Default)]
pub(crate) struct Dependents {
    list: RefCell<Vec<Weak<dyn Invalidate>>>,
}

impl Dependents {
    /// Subscribe the innermost running computation, if any.
    pub(crate) fn track(&self) {
        OBSERVERS.with(|stack| {
            let stack = stack.borrow();
            let Some(Some(observer)) = stack.last() else {
                return;
            };
            let mut list = self.list.borrow_mut();
            if !list.iter().any(|w| Weak::ptr_eq(w, observer)) {
                list.push(observer.clone());
            }
        });
    }

    /// Invalidate and drop every subscriber; they re-subscribe when they recompute.
    pub(crate) fn notify(&self) {
        let drained: Vec<Rc<dyn Invalidate>> = self
            .list
            .borrow_mut()
            .drain(..)
            .filter_map(|w| w.upgrade())
            .collect();
        for dep in drained {
            dep.invalidate();
        }
    }

    pub(crate) fn clear(&self) {
        self.list.borrow_mut().clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.list.borrow().len()
    }
}
