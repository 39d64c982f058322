// ============================================================================
// spark-streams - Lifecycle-Bound Stream Subscriptions
// ============================================================================
//
// Ties the lifetime of stream subscriptions to the lifetime of a host view:
// subscriptions created through a ReactiveContext stop delivering the moment
// the view is destroyed or the context is explicitly unsubscribed. One
// optional side effect - a forced view refresh after each delivered value -
// covers hosts with manual change detection.
//
// The crate is deliberately small: it is a lifecycle gate, not a stream
// engine. Sources implement the `Stream` trait, hosts implement
// `RefreshHandle`, and everything else is wiring.
// ============================================================================

pub mod core;
pub mod primitives;

// Re-export core items at crate root for ergonomic access
pub use crate::core::types::{
    CompleteFn, DestroyFn, ErrorFn, Observer, RefreshHandle, Stream, StreamError, Subscription,
    TeardownFn, ValueFn,
};

// Re-export primitives at crate root
pub use crate::primitives::context::{reactive_context, reactive_context_with, ReactiveContext};
pub use crate::primitives::gate::{gated, GatedStream};
pub use crate::primitives::publisher::{publisher, Publisher};
pub use crate::primitives::termination::{termination_signal, FireFn, ObserverId, TerminationSignal};
pub use crate::primitives::view::{manual_view, ManualView};

// =============================================================================
// TESTS
// =============================================================================
