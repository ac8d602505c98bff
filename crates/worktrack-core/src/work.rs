//! The unit of work observed by the engine.
//!
//! Work lifecycle belongs to the caller; the engine only reads these accessors
//! from the collector and sampler callbacks. Implementations are shared across
//! threads, so anything that changes while the work runs (elapsed time, status,
//! zombie flag) sits behind interior mutability.

use indexmap::IndexMap;

/// Context key/value pairs in the order they were first recorded.
pub type ContextEntries = IndexMap<String, String>;

pub trait Work: Send + Sync + 'static {
    /// Endpoint identifier, e.g. a route template.
    fn endpoint(&self) -> String;

    fn elapsed_millis(&self) -> i64;

    fn status_code(&self) -> Option<String>;

    /// True once the work has outlived its expected completion threshold.
    fn is_zombie(&self) -> bool;

    /// Contextual key/value pairs captured for this work, in insertion order.
    fn context_entries(&self) -> ContextEntries;

    /// Root-cause error name, when the work failed.
    fn error_name(&self) -> Option<String> {
        None
    }
}
