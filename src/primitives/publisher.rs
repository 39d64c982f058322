// ============================================================================
// spark-streams - Publisher
// Hot multicast stream source with sticky terminal events
// ============================================================================
//
// A Publisher pushes values to every live observer as they arrive; there is
// no replay of past values. Terminal events are sticky: after `complete` or
// `error` the registry is drained, later pushes are ignored, and late
// subscribers immediately receive the stored terminal event.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::core::types::{Observer, ObserverState, Stream, StreamError, Subscription};

// =============================================================================
// PUBLISHER
// =============================================================================

/// Identifier for one registration in the observer registry
type SlotId = u64;

#[derive(Clone)]
enum Terminal {
    Open,
    Completed,
    Errored(StreamError),
}

/// A hot multicast stream source.
///
/// Handles are cheap clones sharing one observer registry: clone the
/// publisher into whatever produces values and hand another clone to the
/// consumers (or to a `ReactiveContext`).
pub struct Publisher<T> {
    inner: Rc<PublisherInner<T>>,
}

struct PublisherInner<T> {
    observers: RefCell<Vec<(SlotId, Rc<ObserverState<T>>)>>,
    next_id: Cell<SlotId>,
    terminal: RefCell<Terminal>,
}

impl<T> Publisher<T> {
    /// Create an open publisher with no observers
    pub fn new() -> Self {
        Self {
            inner: Rc::new(PublisherInner {
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                terminal: RefCell::new(Terminal::Open),
            }),
        }
    }

    /// Whether a terminal event has been broadcast
    pub fn is_closed(&self) -> bool {
        !matches!(*self.inner.terminal.borrow(), Terminal::Open)
    }

    /// Number of live registrations
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    /// Broadcast a value to every live observer.
    ///
    /// Ignored after a terminal event.
    pub fn push(&self, value: T) {
        if self.is_closed() {
            return;
        }

        // Snapshot the registry so callbacks may subscribe or unsubscribe
        // mid-broadcast without tripping the RefCell. Observers cancelled
        // mid-broadcast are skipped by their own done flag.
        let snapshot: Vec<Rc<ObserverState<T>>> = self
            .inner
            .observers
            .borrow()
            .iter()
            .map(|(_, state)| state.clone())
            .collect();

        for state in snapshot {
            state.next(&value);
        }
    }

    /// Broadcast the terminal error.
    ///
    /// Drains the registry; late subscribers receive a clone of the error
    /// immediately. Ignored if a terminal event was already broadcast.
    pub fn error(&self, err: StreamError) {
        if self.is_closed() {
            return;
        }

        *self.inner.terminal.borrow_mut() = Terminal::Errored(err.clone());
        trace!("publisher errored");

        let drained: Vec<_> = self.inner.observers.borrow_mut().drain(..).collect();
        for (_, state) in drained {
            state.error(err.clone());
        }
    }

    /// Broadcast completion.
    ///
    /// Drains the registry; late subscribers complete immediately. Ignored
    /// if a terminal event was already broadcast.
    pub fn complete(&self) {
        if self.is_closed() {
            return;
        }

        *self.inner.terminal.borrow_mut() = Terminal::Completed;
        trace!("publisher completed");

        let drained: Vec<_> = self.inner.observers.borrow_mut().drain(..).collect();
        for (_, state) in drained {
            state.complete();
        }
    }
}

impl<T: 'static> Stream<T> for Publisher<T> {
    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let state = ObserverState::new(observer);

        // Sticky terminal: replay it to the late subscriber and hand back
        // an already-closed handle.
        let terminal = self.inner.terminal.borrow().clone();
        match terminal {
            Terminal::Completed => {
                state.complete();
                return Subscription::closed();
            }
            Terminal::Errored(err) => {
                state.error(err);
                return Subscription::closed();
            }
            Terminal::Open => {}
        }

        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.observers.borrow_mut().push((id, state.clone()));
        trace!(id, "publisher registration added");

        let inner = self.inner.clone();
        Subscription::new(move || {
            state.close();
            inner
                .observers
                .borrow_mut()
                .retain(|(slot_id, _)| *slot_id != id);
        })
    }
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create a publisher.
///
/// # Example
///
/// ```ignore
/// let feed = publisher::<i32>();
///
/// feed.subscribe(Observer::values(|v| println!("{v}")));
/// feed.push(1); // prints 1
/// feed.complete();
/// feed.push(2); // ignored
/// ```
pub fn publisher<T>() -> Publisher<T> {
    Publisher::new()
}

// =============================================================================
// TESTS
// =============================================================================
