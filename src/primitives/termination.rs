// ============================================================================
// spark-streams - Termination Signal
// Fire-once, observe-many broadcast primitive gating stream delivery
// ============================================================================
//
// The termination signal is the only state shared between a context and the
// subscriptions created through it. It is single-writer (the context fires
// it, either explicitly or from the view's destruction callback) and
// multi-reader (every gated subscription watches it). Once fired it stays
// fired: observers registered afterwards run immediately.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

// =============================================================================
// TYPE ALIASES
// =============================================================================

/// One-shot callback run when the signal fires
pub type FireFn = Box<dyn FnOnce()>;

/// Identifier for a registered fire observer
pub type ObserverId = u64;

// =============================================================================
// TERMINATION SIGNAL
// =============================================================================

/// A one-shot broadcast signal.
///
/// The first `fire` invokes every registered observer exactly once and
/// closes the signal permanently; later fires are no-ops. Handles are cheap
/// clones sharing the same underlying state.
pub struct TerminationSignal {
    inner: Rc<TerminationInner>,
}

struct TerminationInner {
    fired: Cell<bool>,
    next_id: Cell<ObserverId>,
    observers: RefCell<Vec<(ObserverId, FireFn)>>,
}

impl TerminationSignal {
    /// Create an unfired signal with no observers
    pub fn new() -> Self {
        Self {
            inner: Rc::new(TerminationInner {
                fired: Cell::new(false),
                next_id: Cell::new(1),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Whether the signal has fired
    pub fn is_fired(&self) -> bool {
        self.inner.fired.get()
    }

    /// Register a one-shot observer.
    ///
    /// If the signal has already fired, `f` runs immediately and the
    /// returned id is inert (ids handed out this way are never stored, so
    /// `remove` on them is a no-op).
    pub fn on_fire<F: FnOnce() + 'static>(&self, f: F) -> ObserverId {
        if self.inner.fired.get() {
            f();
            return 0;
        }

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.observers.borrow_mut().push((id, Box::new(f)));
        id
    }

    /// Unregister an observer. No-op for unknown or spent ids.
    pub fn remove(&self, id: ObserverId) {
        self.inner
            .observers
            .borrow_mut()
            .retain(|(observer_id, _)| *observer_id != id);
    }

    /// Fire the signal.
    ///
    /// The first call invokes every registered observer exactly once and
    /// closes the signal; later calls return without effect.
    pub fn fire(&self) {
        if self.inner.fired.replace(true) {
            return;
        }

        trace!("termination signal fired");

        // Drain before invoking so observers may re-enter (register,
        // remove, or fire) without tripping the RefCell.
        let observers: Vec<_> = self.inner.observers.borrow_mut().drain(..).collect();
        for (_, f) in observers {
            f();
        }
    }

    /// Number of observers currently registered
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }
}

impl Clone for TerminationSignal {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Default for TerminationSignal {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create a termination signal.
///
/// # Example
///
/// ```ignore
/// let signal = termination_signal();
///
/// signal.on_fire(|| println!("torn down"));
/// signal.fire(); // prints once
/// signal.fire(); // no-op
/// ```
pub fn termination_signal() -> TerminationSignal {
    TerminationSignal::new()
}

// =============================================================================
// TESTS
// =============================================================================
