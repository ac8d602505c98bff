//! Top-level facade crate for worktrack.
//!
//! Re-exports the core metric tree and the engine so users can depend on a single crate.

pub mod core {
    pub use worktrack_core::*;
}

pub mod engine {
    pub use worktrack_engine::*;
}

pub use worktrack_core::{Bucket, BucketSnapshot, MetricSet, Tag, Work};
pub use worktrack_engine::{Builder, Engine};
