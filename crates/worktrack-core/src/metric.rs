//! Metric variants.
//!
//! The set is closed: `CountMetric`, `LongMetric` and `UniqueMetric`. The
//! [`MetricType`] trait is sealed so the variant check in
//! [`MetricSet::get_metric`](crate::MetricSet::get_metric) stays exhaustive.

use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashSet;
use serde::{Deserialize, Serialize};

use crate::snapshot::MetricValue;

/// Discriminant of the three metric variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Count,
    Long,
    Unique,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Count => "count",
            MetricKind::Long => "long",
            MetricKind::Unique => "unique",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic counter starting at 0.
#[derive(Debug, Default)]
pub struct CountMetric {
    value: AtomicU64,
}

impl CountMetric {
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Signed accumulator starting at 0.
#[derive(Debug, Default)]
pub struct LongMetric {
    value: AtomicI64,
}

impl LongMetric {
    pub fn add(&self, n: i64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Distinct string values; reports the cardinality.
#[derive(Debug, Default)]
pub struct UniqueMetric {
    values: DashSet<String>,
}

impl UniqueMetric {
    pub fn add(&self, value: &str) {
        if !self.values.contains(value) {
            self.values.insert(value.to_owned());
        }
    }

    pub fn get(&self) -> u64 {
        self.values.len() as u64
    }
}

/// A metric stored in a [`MetricSet`](crate::MetricSet).
#[derive(Debug, Clone)]
pub enum Metric {
    Count(Arc<CountMetric>),
    Long(Arc<LongMetric>),
    Unique(Arc<UniqueMetric>),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Count(_) => MetricKind::Count,
            Metric::Long(_) => MetricKind::Long,
            Metric::Unique(_) => MetricKind::Unique,
        }
    }

    /// Current value, tagged with its variant.
    pub fn value(&self) -> MetricValue {
        match self {
            Metric::Count(m) => MetricValue::Count(m.get()),
            Metric::Long(m) => MetricValue::Long(m.get()),
            Metric::Unique(m) => MetricValue::Unique(m.get()),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::CountMetric {}
    impl Sealed for super::LongMetric {}
    impl Sealed for super::UniqueMetric {}
}

/// Implemented by the three metric variants only.
pub trait MetricType: sealed::Sealed + Default + Send + Sync + 'static {
    const KIND: MetricKind;

    fn wrap(metric: Arc<Self>) -> Metric;

    fn unwrap(metric: &Metric) -> Option<Arc<Self>>;
}

impl MetricType for CountMetric {
    const KIND: MetricKind = MetricKind::Count;

    fn wrap(metric: Arc<Self>) -> Metric {
        Metric::Count(metric)
    }

    fn unwrap(metric: &Metric) -> Option<Arc<Self>> {
        match metric {
            Metric::Count(m) => Some(Arc::clone(m)),
            _ => None,
        }
    }
}

impl MetricType for LongMetric {
    const KIND: MetricKind = MetricKind::Long;

    fn wrap(metric: Arc<Self>) -> Metric {
        Metric::Long(metric)
    }

    fn unwrap(metric: &Metric) -> Option<Arc<Self>> {
        match metric {
            Metric::Long(m) => Some(Arc::clone(m)),
            _ => None,
        }
    }
}

impl MetricType for UniqueMetric {
    const KIND: MetricKind = MetricKind::Unique;

    fn wrap(metric: Arc<Self>) -> Metric {
        Metric::Unique(metric)
    }

    fn unwrap(metric: &Metric) -> Option<Arc<Self>> {
        match metric {
            Metric::Unique(m) => Some(Arc::clone(m)),
            _ => None,
        }
    }
}
