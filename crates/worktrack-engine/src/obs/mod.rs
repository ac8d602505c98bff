//! Text exposition of emitted buckets.
//!
//! Buckets are flattened into Prometheus-style lines, one per metric per tree
//! node, with the node's tag path as labels.

pub mod render;

pub use render::render_text;
