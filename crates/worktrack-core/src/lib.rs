//! worktrack core: the tag-keyed metric tree, metric variants, buckets,
//! snapshots, the `Work` contract and the shared error type.
//!
//! This crate carries no runtime dependencies; scheduling, sinks and adapters
//! live in `worktrack-engine`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `WorkTrackError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod bucket;
pub mod error;
pub mod metric;
pub mod metric_set;
pub mod snapshot;
pub mod tag;
pub mod work;

pub use bucket::{epoch_millis, Bucket};
pub use error::{ErrorCode, Result, WorkTrackError};
pub use metric::{CountMetric, LongMetric, Metric, MetricKind, MetricType, UniqueMetric};
pub use metric_set::MetricSet;
pub use snapshot::{BucketSnapshot, ChildSnapshot, MetricSetSnapshot, MetricValue};
pub use tag::Tag;
pub use work::{ContextEntries, Work};
