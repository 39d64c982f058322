// ============================================================================
// spark-streams - Type Definitions
// Seam traits and base types for lifecycle-bound subscriptions
// ============================================================================
//
// Two external collaborators meet the crate here:
// - A stream engine, abstracted as the `Stream` trait: anything that can
//   accept an `Observer` and hand back a `Subscription`.
// - A view lifecycle provider, abstracted as the `RefreshHandle` trait:
//   anything that can notify on destruction and force a manual re-render.
//
// The delivery discipline shared by every stream in this crate (no values
// after a terminal event, at most one terminal event per registration)
// lives in `ObserverState`; stream implementations route deliveries
// through it instead of calling user callbacks directly.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

// =============================================================================
// TYPE ALIASES
// =============================================================================

/// Value callback, invoked once per delivered value
pub type ValueFn<T> = Box<dyn Fn(&T)>;

/// Error callback, invoked at most once per registration
pub type ErrorFn = Box<dyn FnOnce(StreamError)>;

/// Completion callback, invoked at most once per registration
pub type CompleteFn = Box<dyn FnOnce()>;

/// Destruction callback registered on a view handle
pub type DestroyFn = Box<dyn FnOnce()>;

/// Teardown function run when a subscription is cancelled
pub type TeardownFn = Box<dyn FnOnce()>;

// =============================================================================
// STREAM ERROR
// =============================================================================

/// Errors surfaced by this crate, by kind.
///
/// Synchronous API errors (`NotConnected`) are returned as `Err` from the
/// call that caused them. Asynchronous delivery errors (`Upstream`) travel
/// through a subscription's error callback and never touch the context's
/// termination signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// `subscribe` was called before any stream was connected
    NotConnected,
    /// The upstream source reported a failure
    Upstream(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::NotConnected => {
                write!(f, "no stream has been connected to this context")
            }
            StreamError::Upstream(message) => write!(f, "upstream error: {message}"),
        }
    }
}

impl std::error::Error for StreamError {}

// =============================================================================
// OBSERVER
// =============================================================================

/// Callback bundle for a single subscription.
///
/// All three callbacks are optional. Build with the consuming setters:
///
/// ```ignore
/// let observer = Observer::values(|v: &i32| println!("{v}"))
///     .on_error(|e| eprintln!("{e}"))
///     .on_complete(|| println!("done"));
/// ```
///
/// Value callbacks receive the value by reference so a source can multicast
/// without cloning. Error and completion callbacks are `FnOnce`: a stream
/// delivers at most one terminal event per registration.
pub struct Observer<T> {
    pub(crate) value: Option<ValueFn<T>>,
    pub(crate) error: Option<ErrorFn>,
    pub(crate) complete: Option<CompleteFn>,
}

impl<T> Observer<T> {
    /// Create an observer with no callbacks
    pub fn new() -> Self {
        Self {
            value: None,
            error: None,
            complete: None,
        }
    }

    /// Shorthand for an observer with only a value callback
    pub fn values<F: Fn(&T) + 'static>(f: F) -> Self {
        Self::new().on_value(f)
    }

    /// Set the value callback
    pub fn on_value<F: Fn(&T) + 'static>(mut self, f: F) -> Self {
        self.value = Some(Box::new(f));
        self
    }

    /// Set the error callback
    pub fn on_error<F: FnOnce(StreamError) + 'static>(mut self, f: F) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    /// Set the completion callback
    pub fn on_complete<F: FnOnce() + 'static>(mut self, f: F) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    // Delivery entry points for `Stream` implementors outside this crate.
    // Streams inside the crate route through `ObserverState` instead, which
    // adds the shared done-flag discipline on top of these.

    /// Invoke the value callback, if any
    pub fn notify(&self, value: &T) {
        if let Some(ref f) = self.value {
            f(value);
        }
    }

    /// Consume the observer, invoking the error callback if any
    pub fn fail(self, err: StreamError) {
        if let Some(f) = self.error {
            f(err);
        }
    }

    /// Consume the observer, invoking the completion callback if any
    pub fn finish(self) {
        if let Some(f) = self.complete {
            f();
        }
    }
}

impl<T> Default for Observer<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// OBSERVER STATE
// =============================================================================

/// Live delivery state for one registration.
///
/// Invariants enforced here, for every stream in the crate:
/// - no value is delivered after a terminal event or cancellation
/// - at most one terminal event (error or completion) is ever delivered
/// - `close` silences the observer without delivering anything
pub(crate) struct ObserverState<T> {
    value: Option<ValueFn<T>>,
    error: RefCell<Option<ErrorFn>>,
    complete: RefCell<Option<CompleteFn>>,
    done: Cell<bool>,
}

impl<T> ObserverState<T> {
    pub(crate) fn new(observer: Observer<T>) -> Rc<Self> {
        Rc::new(Self {
            value: observer.value,
            error: RefCell::new(observer.error),
            complete: RefCell::new(observer.complete),
            done: Cell::new(false),
        })
    }

    /// Deliver a value, unless a terminal event already happened
    pub(crate) fn next(&self, value: &T) {
        if self.done.get() {
            return;
        }
        if let Some(ref f) = self.value {
            f(value);
        }
    }

    /// Deliver the terminal error
    pub(crate) fn error(&self, err: StreamError) {
        if self.done.replace(true) {
            return;
        }
        // Release the borrow before invoking; the callback may re-enter.
        let callback = self.error.borrow_mut().take();
        if let Some(f) = callback {
            f(err);
        }
    }

    /// Deliver completion
    pub(crate) fn complete(&self) {
        if self.done.replace(true) {
            return;
        }
        let callback = self.complete.borrow_mut().take();
        if let Some(f) = callback {
            f();
        }
    }

    /// Silence the observer without delivering a terminal event
    pub(crate) fn close(&self) {
        if self.done.replace(true) {
            return;
        }
        self.error.borrow_mut().take();
        self.complete.borrow_mut().take();
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle representing an active registration against a stream.
///
/// Cancelling is idempotent. Dropping the handle does NOT cancel the
/// registration: lifecycle management belongs to the owning context, and
/// callers are free to discard the handle.
pub struct Subscription {
    inner: Rc<SubscriptionInner>,
}

struct SubscriptionInner {
    closed: Cell<bool>,
    teardown: RefCell<Option<TeardownFn>>,
}

impl Subscription {
    /// Create a subscription whose cancellation runs `teardown`
    pub fn new<F: FnOnce() + 'static>(teardown: F) -> Self {
        Self {
            inner: Rc::new(SubscriptionInner {
                closed: Cell::new(false),
                teardown: RefCell::new(Some(Box::new(teardown))),
            }),
        }
    }

    /// Create an already-cancelled subscription; `unsubscribe` is a no-op
    pub fn closed() -> Self {
        Self {
            inner: Rc::new(SubscriptionInner {
                closed: Cell::new(true),
                teardown: RefCell::new(None),
            }),
        }
    }

    /// Whether `unsubscribe` has run (or the handle was created closed)
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// Cancel the registration. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if self.inner.closed.replace(true) {
            return;
        }
        let teardown = self.inner.teardown.borrow_mut().take();
        if let Some(f) = teardown {
            f();
        }
    }
}

impl Clone for Subscription {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

// =============================================================================
// SEAM TRAITS
// =============================================================================

/// A producer of values delivered over time through callbacks.
///
/// Implemented by every stream in this crate; implement it on your own
/// source types to make them connectable to a `ReactiveContext`.
pub trait Stream<T> {
    /// Register an observer; returns the handle for early cancellation.
    fn subscribe(&self, observer: Observer<T>) -> Subscription;
}

/// The host view's capability surface: destruction notification plus a
/// manual re-render trigger.
pub trait RefreshHandle {
    /// Run `callback` exactly once when the view is destroyed.
    ///
    /// Registering on an already-destroyed view runs the callback
    /// immediately.
    fn on_destroy(&self, callback: DestroyFn);

    /// Flush pending UI updates now.
    fn refresh(&self);
}

// =============================================================================
// TESTS
// =============================================================================
