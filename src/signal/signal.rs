use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::animation::ease::Ease;
use crate::animation::lerp::Lerp;
use crate::animation::task::Tween;
use crate::signal::tracker::{Dependents, Invalidate, observe, untracked};

/// Either a plain value or a producer re-evaluated whenever its dependencies change.
pub enum SignalValue<T> {
    Value(T),
    Reactive(Rc<dyn Fn() -> T>),
}

impl<T> SignalValue<T> {
    pub fn reactive(f: impl Fn() -> T + 'static) -> Self {
        Self::Reactive(Rc::new(f))
    }

    pub fn is_reactive(&self) -> bool {
        matches!(self, Self::Reactive(_))
    }
}

impl<T: Clone> SignalValue<T> {
    /// Evaluate the value (calling the producer, if any).
    pub fn resolve(&self) -> T {
        match self {
            Self::Value(v) => v.clone(),
            Self::Reactive(f) => f(),
        }
    }
}

impl<T: Clone> Clone for SignalValue<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(v) => Self::Value(v.clone()),
            Self::Reactive(f) => Self::Reactive(Rc::clone(f)),
        }
    }
}

impl<T> From<T> for SignalValue<T> {
    fn from(v: T) -> Self {
        Self::Value(v)
    }
}

impl<T: fmt::Debug> fmt::Debug for SignalValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Reactive(_) => f.write_str("Reactive(..)"),
        }
    }
}

struct SignalCore<T> {
    initial: SignalValue<T>,
    current: RefCell<SignalValue<T>>,
    cached: RefCell<Option<T>>,
    dirty: Cell<bool>,
    explicit: Cell<bool>,
    parser: Option<fn(T) -> T>,
    dependents: Dependents,
    this: Weak<SignalCore<T>>,
}

impl<T: 'static> Invalidate for SignalCore<T> {
    fn invalidate(&self) {
        if self.dirty.replace(true) {
            return;
        }
        self.dependents.notify();
    }
}

/// A dependency-tracked, lazily recomputed value.
///
/// Cloning a `Signal` clones the handle; both handles observe and mutate the same value.
pub struct Signal<T: 'static>(Rc<SignalCore<T>>);

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug + Clone + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("current", &*self.0.current.borrow())
            .field("explicit", &self.0.explicit.get())
            .finish()
    }
}

impl<T: Clone + 'static> Signal<T> {
    pub fn new(initial: impl Into<SignalValue<T>>) -> Self {
        Self::build(initial.into(), None)
    }

    /// A signal whose every resolved value is passed through `parser` (clamping, normalizing).
    pub fn with_parser(initial: impl Into<SignalValue<T>>, parser: fn(T) -> T) -> Self {
        Self::build(initial.into(), Some(parser))
    }

    pub fn reactive(f: impl Fn() -> T + 'static) -> Self {
        Self::build(SignalValue::reactive(f), None)
    }

    fn build(initial: SignalValue<T>, parser: Option<fn(T) -> T>) -> Self {
        Self(Rc::new_cyclic(|this| SignalCore {
            current: RefCell::new(initial.clone()),
            initial,
            cached: RefCell::new(None),
            dirty: Cell::new(true),
            explicit: Cell::new(false),
            parser,
            dependents: Dependents::default(),
            this: this.clone(),
        }))
    }

    /// Read the value, subscribing the running computation (if any).
    pub fn get(&self) -> T {
        let core = &self.0;
        core.dependents.track();
        if !core.dirty.get()
            && let Some(v) = core.cached.borrow().as_ref()
        {
            return v.clone();
        }

        let raw = core.current.borrow().clone();
        let value = match raw {
            SignalValue::Value(v) => v,
            SignalValue::Reactive(f) => {
                let observer: Weak<dyn Invalidate> = core.this.clone();
                observe(Some(observer), || f())
            }
        };
        let value = match core.parser {
            Some(parse) => parse(value),
            None => value,
        };
        *core.cached.borrow_mut() = Some(value.clone());
        core.dirty.set(false);
        value
    }

    /// Read without subscribing.
    pub fn peek(&self) -> T {
        untracked(|| self.get())
    }

    pub fn set(&self, value: impl Into<SignalValue<T>>) {
        *self.0.current.borrow_mut() = value.into();
        self.0.explicit.set(true);
        self.mark_changed();
    }

    /// Restore the initial value; the signal reports [`Signal::is_initial`] again.
    pub fn reset(&self) {
        *self.0.current.borrow_mut() = self.0.initial.clone();
        self.0.explicit.set(false);
        self.mark_changed();
    }

    fn mark_changed(&self) {
        self.0.cached.borrow_mut().take();
        self.0.dirty.set(true);
        self.0.dependents.notify();
    }

    pub fn raw(&self) -> SignalValue<T> {
        self.0.current.borrow().clone()
    }

    pub fn is_initial(&self) -> bool {
        !self.0.explicit.get()
    }

    pub fn is_reactive(&self) -> bool {
        self.0.current.borrow().is_reactive()
    }

    /// Drop any producer and all subscriptions. The last resolved value is kept.
    pub fn dispose(&self) {
        let last = self.0.cached.borrow().clone();
        if let Some(v) = last {
            *self.0.current.borrow_mut() = SignalValue::Value(v);
        } else if self.is_reactive() {
            *self.0.current.borrow_mut() = self.0.initial.clone();
        }
        self.0.dependents.clear();
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[cfg(test)]
    pub(crate) fn dependent_count(&self) -> usize {
        self.0.dependents.len()
    }
}

impl<T: Clone + Lerp + 'static> Signal<T> {
    /// Animate from the value observed on the first frame to `to`.
    ///
    /// The target may be reactive: it is re-evaluated every frame and kept as the signal's
    /// producer once the tween completes.
    pub fn tween(&self, to: impl Into<SignalValue<T>>, duration: f64, ease: Ease) -> Tween {
        let target = to.into();
        let signal = self.clone();
        let frame_target = target.clone();
        let mut from: Option<T> = None;
        Tween::new(duration, ease, move |t| {
            let start = from.get_or_insert_with(|| signal.peek());
            let end = frame_target.resolve();
            signal.set(T::lerp(start, &end, t));
        })
        .on_finish({
            let signal = self.clone();
            move || signal.set(target)
        })
    }
}

/// A read-only memoized derivation.
pub struct Computed<T: 'static>(Signal<T>);

impl<T: 'static> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Clone + 'static> Computed<T> {
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self(Signal::reactive(f))
    }

    pub fn get(&self) -> T {
        self.0.get()
    }

    pub fn peek(&self) -> T {
        self.0.peek()
    }

    pub fn dispose(&self) {
        self.0.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/signal/signal.rs"]
mod tests;
