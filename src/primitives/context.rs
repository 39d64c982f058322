// ============================================================================
// spark-streams - Reactive Context
// Binds stream subscriptions to a host view's destruction lifecycle
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::core::types::{Observer, RefreshHandle, Stream, StreamError, Subscription};
use crate::primitives::gate::GatedStream;
use crate::primitives::termination::TerminationSignal;

// =============================================================================
// REACTIVE CONTEXT
// =============================================================================

/// Binds the lifetime of stream subscriptions to the lifetime of a host
/// view, with an optional forced re-render after each delivered value.
///
/// A context owns one termination signal, wired to the view's destruction
/// event at construction. Every stream connected to the context is gated on
/// that signal: subscriptions stop receiving values the moment the view is
/// destroyed or `unsubscribe` is called, whichever happens first. Both paths
/// close the same signal, so they leave the context in the same terminal
/// state.
///
/// # Example
///
/// ```ignore
/// let view = manual_view();
/// let prices = publisher::<f64>();
///
/// let ctx = reactive_context_with(prices.clone(), view.clone());
/// ctx.subscribe_and_render(Observer::values(|p| println!("{p}")))?;
///
/// prices.push(101.5); // delivered, then the view refreshes
/// view.destroy();     // subscription completes
/// prices.push(99.0);  // never delivered
/// ```
pub struct ReactiveContext<T> {
    termination: TerminationSignal,
    current: RefCell<Option<GatedStream<T>>>,
    view: Rc<dyn RefreshHandle>,
}

impl<T: 'static> ReactiveContext<T> {
    fn new(view: Rc<dyn RefreshHandle>) -> Self {
        let termination = TerminationSignal::new();

        // Exactly one destruction callback per context.
        let signal = termination.clone();
        view.on_destroy(Box::new(move || signal.fire()));

        debug!("reactive context created");

        Self {
            termination,
            current: RefCell::new(None),
            view,
        }
    }

    /// Replace the stream available for subscription.
    ///
    /// Subscriptions already created keep following the stream they were
    /// created from; only the termination signal decides when those stop.
    /// Connecting after termination is allowed, but the resulting stream is
    /// already exhausted for any subscriber. Returns `&Self` so calls can
    /// be chained.
    pub fn connect(&self, stream: impl Stream<T> + 'static) -> &Self {
        trace!("stream connected");
        *self.current.borrow_mut() = Some(GatedStream::new(stream, &self.termination));
        self
    }

    /// Subscribe to the current stream, gated on the view's lifetime.
    ///
    /// Values, errors, and completion are delivered exactly as the
    /// underlying stream produces them, except that delivery stops
    /// permanently once the termination signal has fired. Returns the
    /// subscription handle so the caller may additionally cancel early,
    /// independent of context-level termination.
    ///
    /// # Errors
    ///
    /// `StreamError::NotConnected` if no stream has ever been connected.
    pub fn subscribe(&self, observer: Observer<T>) -> Result<Subscription, StreamError> {
        // Clone the gate out of the cell: subscribing may run user
        // callbacks synchronously, and those may call back into `connect`.
        let gated = self
            .current
            .borrow()
            .clone()
            .ok_or(StreamError::NotConnected)?;
        Ok(gated.subscribe(observer))
    }

    /// Like [`subscribe`](Self::subscribe), but force a view refresh after
    /// every delivered value.
    ///
    /// The caller's value callback (if any) runs first, then the view's
    /// refresh, unconditionally. Errors and completion pass through without
    /// a refresh.
    pub fn subscribe_and_render(&self, observer: Observer<T>) -> Result<Subscription, StreamError> {
        let Observer {
            value,
            error,
            complete,
        } = observer;

        let view = self.view.clone();
        let mut rendered = Observer::new().on_value(move |v: &T| {
            if let Some(ref f) = value {
                f(v);
            }
            view.refresh();
        });
        rendered.error = error;
        rendered.complete = complete;

        self.subscribe(rendered)
    }

    /// Fire the termination signal, permanently ending every subscription
    /// created through this context.
    ///
    /// Idempotent: the signal fires once and stays closed, so calling this
    /// again (or destroying the view afterwards) has no further effect.
    /// Subsequent `subscribe` calls yield immediately-completed
    /// subscriptions that deliver nothing.
    pub fn unsubscribe(&self) {
        self.termination.fire();
    }

    /// Whether the context has reached its terminal state
    pub fn is_terminated(&self) -> bool {
        self.termination.is_fired()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create a context bound to `view`, with no stream connected yet.
///
/// Subscribing before a stream is connected is a usage error and returns
/// `StreamError::NotConnected`.
pub fn reactive_context<T: 'static>(view: impl RefreshHandle + 'static) -> ReactiveContext<T> {
    ReactiveContext::new(Rc::new(view))
}

/// Create a context bound to `view` with `stream` already connected.
pub fn reactive_context_with<T: 'static>(
    stream: impl Stream<T> + 'static,
    view: impl RefreshHandle + 'static,
) -> ReactiveContext<T> {
    let ctx = ReactiveContext::new(Rc::new(view));
    ctx.connect(stream);
    ctx
}

// =============================================================================
// TESTS
// =============================================================================
