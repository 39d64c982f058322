// ============================================================================
// spark-streams - Manual View
// Hand-driven view-lifecycle provider for embedders and tests
// ============================================================================
//
// Real hosts implement `RefreshHandle` on their own view types. ManualView
// stands in where no UI framework is present: destruction is triggered by
// calling `destroy`, refreshes bump an observable counter and run an
// optional render hook.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::core::types::{DestroyFn, RefreshHandle};

// =============================================================================
// MANUAL VIEW
// =============================================================================

/// A hand-driven view handle.
///
/// Handles are cheap clones sharing the same lifecycle state, so one clone
/// can be handed to a `ReactiveContext` while another drives destruction.
pub struct ManualView {
    inner: Rc<ManualViewInner>,
}

struct ManualViewInner {
    destroyed: Cell<bool>,
    callbacks: RefCell<Vec<DestroyFn>>,
    refreshes: Cell<u64>,
    render: RefCell<Option<Rc<dyn Fn()>>>,
}

impl ManualView {
    /// Create a live view with no destruction callbacks
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ManualViewInner {
                destroyed: Cell::new(false),
                callbacks: RefCell::new(Vec::new()),
                refreshes: Cell::new(0),
                render: RefCell::new(None),
            }),
        }
    }

    /// Whether `destroy` has run
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Number of refreshes triggered so far
    pub fn refresh_count(&self) -> u64 {
        self.inner.refreshes.get()
    }

    /// Install a hook run on every `refresh`
    pub fn on_refresh<F: Fn() + 'static>(&self, f: F) {
        *self.inner.render.borrow_mut() = Some(Rc::new(f));
    }

    /// Destroy the view.
    ///
    /// The first call runs every destruction callback exactly once; later
    /// calls return without effect.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }

        trace!("view destroyed");

        let callbacks: Vec<_> = self.inner.callbacks.borrow_mut().drain(..).collect();
        for f in callbacks {
            f();
        }
    }
}

impl RefreshHandle for ManualView {
    fn on_destroy(&self, callback: DestroyFn) {
        if self.inner.destroyed.get() {
            callback();
            return;
        }
        self.inner.callbacks.borrow_mut().push(callback);
    }

    fn refresh(&self) {
        self.inner.refreshes.set(self.inner.refreshes.get() + 1);
        let hook = self.inner.render.borrow().clone();
        if let Some(f) = hook {
            f();
        }
    }
}

impl Clone for ManualView {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Default for ManualView {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create a manual view handle.
///
/// # Example
///
/// ```ignore
/// let view = manual_view();
///
/// view.on_destroy(Box::new(|| println!("gone")));
/// view.refresh();
/// assert_eq!(view.refresh_count(), 1);
///
/// view.destroy(); // prints once
/// view.destroy(); // no-op
/// ```
pub fn manual_view() -> ManualView {
    ManualView::new()
}

// =============================================================================
// TESTS
// =============================================================================
