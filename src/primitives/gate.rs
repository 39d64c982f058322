// ============================================================================
// spark-streams - Gated Stream
// Deliver from a source until a termination signal fires, then complete
// ============================================================================

use std::rc::Rc;

use crate::core::types::{Observer, ObserverState, Stream, Subscription};
use crate::primitives::termination::TerminationSignal;

// =============================================================================
// GATED STREAM
// =============================================================================

/// A stream combined with a termination signal.
///
/// Subscriptions pass values, errors, and completion through from the
/// source unchanged, with one modification: the moment the signal fires,
/// every live subscription delivers completion and detaches from the
/// source. Subscribing after the signal has fired yields an
/// immediately-completed registration that delivers nothing.
pub struct GatedStream<T> {
    source: Rc<dyn Stream<T>>,
    until: TerminationSignal,
}

impl<T: 'static> GatedStream<T> {
    /// Combine `source` with `until`
    pub fn new(source: impl Stream<T> + 'static, until: &TerminationSignal) -> Self {
        Self {
            source: Rc::new(source),
            until: until.clone(),
        }
    }
}

impl<T: 'static> Stream<T> for GatedStream<T> {
    fn subscribe(&self, observer: Observer<T>) -> Subscription {
        let state = ObserverState::new(observer);

        // A closed signal means the combined stream is already exhausted.
        if self.until.is_fired() {
            state.complete();
            return Subscription::closed();
        }

        let bridge = {
            let on_value = state.clone();
            let on_error = state.clone();
            let on_complete = state.clone();
            Observer::new()
                .on_value(move |v| on_value.next(v))
                .on_error(move |e| on_error.error(e))
                .on_complete(move || on_complete.complete())
        };
        let inner = self.source.subscribe(bridge);

        // Completion first, then detach: the done flag set by complete()
        // blocks any source value still in flight during the fire.
        let watcher = self.until.on_fire({
            let state = state.clone();
            let inner = inner.clone();
            move || {
                state.complete();
                inner.unsubscribe();
            }
        });

        let until = self.until.clone();
        Subscription::new(move || {
            state.close();
            inner.unsubscribe();
            until.remove(watcher);
        })
    }
}

impl<T> Clone for GatedStream<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            until: self.until.clone(),
        }
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Combine a stream with a termination signal.
///
/// # Example
///
/// ```ignore
/// let stop = termination_signal();
/// let feed = publisher::<i32>();
///
/// let gated = gated(feed.clone(), &stop);
/// gated.subscribe(Observer::values(|v| println!("{v}")));
///
/// feed.push(1); // delivered
/// stop.fire();  // subscription completes
/// feed.push(2); // never delivered
/// ```
pub fn gated<T: 'static>(
    source: impl Stream<T> + 'static,
    until: &TerminationSignal,
) -> GatedStream<T> {
    GatedStream::new(source, until)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StreamError;
    use crate::primitives::publisher::publisher;
    use crate::primitives::termination::termination_signal;
    use std::cell::{Cell, RefCell};

    #[test]
    fn passes_values_through_while_signal_is_open() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let stop = termination_signal();
        let feed = publisher::<i32>();
        let stream = gated(feed.clone(), &stop);

        stream.subscribe(Observer::values(move |v: &i32| {
            seen_clone.borrow_mut().push(*v)
        }));

        feed.push(1);
        feed.push(2);

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn fire_completes_subscription_and_stops_values() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let completions = Rc::new(Cell::new(0));
        let completions_clone = completions.clone();

        let stop = termination_signal();
        let feed = publisher::<i32>();
        let stream = gated(feed.clone(), &stop);

        stream.subscribe(
            Observer::values(move |v: &i32| seen_clone.borrow_mut().push(*v))
                .on_complete(move || completions_clone.set(completions_clone.get() + 1)),
        );

        feed.push(1);
        stop.fire();
        feed.push(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(completions.get(), 1);
        assert_eq!(feed.observer_count(), 0, "gate must detach from the source");
    }

    #[test]
    fn subscribe_after_fire_completes_immediately() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let completed = Rc::new(Cell::new(false));
        let completed_clone = completed.clone();

        let stop = termination_signal();
        let feed = publisher::<i32>();
        let stream = gated(feed.clone(), &stop);

        stop.fire();
        let sub = stream.subscribe(
            Observer::values(move |v: &i32| seen_clone.borrow_mut().push(*v))
                .on_complete(move || completed_clone.set(true)),
        );
        feed.push(1);

        assert!(seen.borrow().is_empty());
        assert!(completed.get());
        assert!(sub.is_closed());
        assert_eq!(feed.observer_count(), 0, "nothing may reach the source");
    }

    #[test]
    fn early_unsubscribe_is_silent() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let completed = Rc::new(Cell::new(false));
        let completed_clone = completed.clone();

        let stop = termination_signal();
        let feed = publisher::<i32>();
        let stream = gated(feed.clone(), &stop);

        let sub = stream.subscribe(
            Observer::values(move |v: &i32| seen_clone.borrow_mut().push(*v))
                .on_complete(move || completed_clone.set(true)),
        );

        feed.push(1);
        sub.unsubscribe();
        feed.push(2);

        assert_eq!(*seen.borrow(), vec![1]);
        assert!(!completed.get(), "cancellation must not deliver completion");
        assert_eq!(stop.observer_count(), 0, "gate watcher must be removed");
        assert_eq!(feed.observer_count(), 0);
    }

    #[test]
    fn upstream_error_passes_through_without_firing_signal() {
        let errors = Rc::new(RefCell::new(Vec::new()));
        let errors_clone = errors.clone();

        let stop = termination_signal();
        let feed = publisher::<i32>();
        let stream = gated(feed.clone(), &stop);

        stream.subscribe(Observer::<i32>::new().on_error(move |e| {
            errors_clone.borrow_mut().push(e)
        }));

        feed.error(StreamError::Upstream("boom".into()));

        assert_eq!(*errors.borrow(), vec![StreamError::Upstream("boom".into())]);
        assert!(!stop.is_fired());
    }

    #[test]
    fn fire_after_source_completion_delivers_nothing_more() {
        let completions = Rc::new(Cell::new(0));
        let completions_clone = completions.clone();

        let stop = termination_signal();
        let feed = publisher::<i32>();
        let stream = gated(feed.clone(), &stop);

        stream.subscribe(
            Observer::<i32>::new()
                .on_complete(move || completions_clone.set(completions_clone.get() + 1)),
        );

        feed.complete();
        stop.fire();

        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn subscriptions_on_one_gate_are_independent() {
        let a = Rc::new(RefCell::new(Vec::new()));
        let b = Rc::new(RefCell::new(Vec::new()));
        let a_clone = a.clone();
        let b_clone = b.clone();

        let stop = termination_signal();
        let feed = publisher::<i32>();
        let stream = gated(feed.clone(), &stop);

        let first = stream.subscribe(Observer::values(move |v: &i32| {
            a_clone.borrow_mut().push(*v)
        }));
        stream.subscribe(Observer::values(move |v: &i32| {
            b_clone.borrow_mut().push(*v)
        }));

        feed.push(1);
        first.unsubscribe();
        feed.push(2);

        assert_eq!(*a.borrow(), vec![1]);
        assert_eq!(*b.borrow(), vec![1, 2]);
    }
}
