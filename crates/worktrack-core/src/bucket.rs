use std::ops::Deref;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::metric_set::MetricSet;
use crate::snapshot::BucketSnapshot;

/// Root [`MetricSet`] of one collector window.
///
/// Dereferences to its root set, so collectors write to it directly.
#[derive(Debug)]
pub struct Bucket {
    start: SystemTime,
    root: MetricSet,
}

impl Bucket {
    pub fn new(start: SystemTime) -> Self {
        Self {
            start,
            root: MetricSet::new(),
        }
    }

    /// Bucket starting now.
    pub fn starting_now() -> Self {
        Self::new(SystemTime::now())
    }

    pub fn start(&self) -> SystemTime {
        self.start
    }

    pub fn start_millis(&self) -> u64 {
        epoch_millis(self.start)
    }

    pub fn root(&self) -> &MetricSet {
        &self.root
    }

    /// Freeze the window into an immutable snapshot ending at `end`.
    pub fn snapshot(&self, end: SystemTime) -> BucketSnapshot {
        BucketSnapshot {
            start_millis: self.start_millis(),
            end_millis: epoch_millis(end),
            root: self.root.snapshot(),
        }
    }
}

impl Deref for Bucket {
    type Target = MetricSet;

    fn deref(&self) -> &MetricSet {
        &self.root
    }
}

/// Milliseconds since the Unix epoch; clamps pre-epoch times to 0.
pub fn epoch_millis(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
