// ============================================================================
// spark-streams - Primitives Module
// Core primitives: termination, publisher, gate, context, view
// ============================================================================

pub mod context;
pub mod gate;
pub mod publisher;
pub mod termination;
pub mod view;

// Re-export for convenience
pub use context::{reactive_context, reactive_context_with, ReactiveContext};
pub use gate::{gated, GatedStream};
pub use publisher::{publisher, Publisher};
pub use termination::{termination_signal, FireFn, ObserverId, TerminationSignal};
pub use view::{manual_view, ManualView};
