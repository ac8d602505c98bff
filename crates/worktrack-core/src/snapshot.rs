//! Immutable copies of a metric tree, handed to output sinks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metric::MetricKind;
use crate::tag::Tag;

/// A metric's value tagged with its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Count(u64),
    Long(i64),
    /// Cardinality of the distinct values seen.
    Unique(u64),
}

impl MetricValue {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Count(_) => MetricKind::Count,
            MetricValue::Long(_) => MetricKind::Long,
            MetricValue::Unique(_) => MetricKind::Unique,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match *self {
            MetricValue::Count(v) | MetricValue::Unique(v) => i64::try_from(v).unwrap_or(i64::MAX),
            MetricValue::Long(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSnapshot {
    pub tag: Tag,
    pub set: MetricSetSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSetSnapshot {
    pub metrics: BTreeMap<String, MetricValue>,
    /// Sorted by tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildSnapshot>,
}

impl MetricSetSnapshot {
    pub fn new(metrics: BTreeMap<String, MetricValue>, mut children: Vec<(Tag, MetricSetSnapshot)>) -> Self {
        children.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            metrics,
            children: children
                .into_iter()
                .map(|(tag, set)| ChildSnapshot { tag, set })
                .collect(),
        }
    }

    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        self.metrics.get(name).copied()
    }

    pub fn child(&self, name: &str, value: &str) -> Option<&MetricSetSnapshot> {
        self.children
            .iter()
            .find(|c| c.tag.name() == name && c.tag.value() == value)
            .map(|c| &c.set)
    }

    /// Walk nested tags from this node, e.g. `[("endpoint", "/a"), ("status", "200")]`.
    pub fn path(&self, tags: &[(&str, &str)]) -> Option<&MetricSetSnapshot> {
        tags.iter()
            .try_fold(self, |node, (name, value)| node.child(name, value))
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.children.is_empty()
    }
}

/// One emitted collector window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSnapshot {
    /// Window start, milliseconds since the Unix epoch.
    pub start_millis: u64,
    /// Moment of rotation (or shutdown), milliseconds since the Unix epoch.
    pub end_millis: u64,
    pub root: MetricSetSnapshot,
}

impl BucketSnapshot {
    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        self.root.metric(name)
    }

    pub fn child(&self, name: &str, value: &str) -> Option<&MetricSetSnapshot> {
        self.root.child(name, value)
    }

    pub fn path(&self, tags: &[(&str, &str)]) -> Option<&MetricSetSnapshot> {
        self.root.path(tags)
    }
}
