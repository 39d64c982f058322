// ============================================================================
// spark-streams - Core Module
// Seam traits and base types for lifecycle-bound subscriptions
// ============================================================================

pub mod types;

// Re-export commonly used items
pub use types::{
    CompleteFn, DestroyFn, ErrorFn, Observer, RefreshHandle, Stream, StreamError, Subscription,
    TeardownFn, ValueFn,
};
