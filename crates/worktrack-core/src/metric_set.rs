//! Tag-keyed metric tree node.
//!
//! A `MetricSet` owns `name -> Metric` and `Tag -> MetricSet` maps backed by
//! `DashMap`. Both lookups create on first access; creation happens inside the
//! shard's entry lock, so racing callers all observe the single instance that
//! won. Nothing is ever removed from a node.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{Result, WorkTrackError};
use crate::metric::{CountMetric, LongMetric, Metric, MetricType, UniqueMetric};
use crate::snapshot::MetricSetSnapshot;
use crate::tag::Tag;

#[derive(Debug, Default)]
pub struct MetricSet {
    metrics: DashMap<String, Metric>,
    children: DashMap<Tag, Arc<MetricSet>>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self {
            metrics: DashMap::new(),
            children: DashMap::new(),
        }
    }

    /// Return the metric registered under `name`, creating a `T` if absent.
    ///
    /// Fails with [`WorkTrackError::VariantMismatch`] when `name` already holds
    /// a different variant.
    pub fn get_metric<T: MetricType>(&self, name: &str) -> Result<Arc<T>> {
        let metric = match self.metrics.get(name).map(|r| r.value().clone()) {
            Some(m) => m,
            None => self
                .metrics
                .entry(name.to_owned())
                .or_insert_with(|| T::wrap(Arc::new(T::default())))
                .value()
                .clone(),
        };

        T::unwrap(&metric).ok_or_else(|| WorkTrackError::VariantMismatch {
            name: name.to_owned(),
            existing: metric.kind(),
            requested: T::KIND,
        })
    }

    pub fn count(&self, name: &str) -> Result<Arc<CountMetric>> {
        self.get_metric::<CountMetric>(name)
    }

    pub fn long(&self, name: &str) -> Result<Arc<LongMetric>> {
        self.get_metric::<LongMetric>(name)
    }

    pub fn unique(&self, name: &str) -> Result<Arc<UniqueMetric>> {
        self.get_metric::<UniqueMetric>(name)
    }

    /// Return the child keyed by `tag`, creating an empty one if absent.
    pub fn get_metric_set(&self, tag: Tag) -> Arc<MetricSet> {
        if let Some(child) = self.children.get(&tag) {
            return Arc::clone(child.value());
        }
        let child = self.children.entry(tag).or_insert_with(Default::default);
        Arc::clone(child.value())
    }

    /// Shorthand for `get_metric_set(Tag::new(name, value))`.
    pub fn child(&self, name: &str, value: &str) -> Arc<MetricSet> {
        self.get_metric_set(Tag::new(name, value))
    }

    /// Read-only lookup; never creates.
    pub fn metric(&self, name: &str) -> Option<Metric> {
        self.metrics.get(name).map(|r| r.value().clone())
    }

    /// Read-only lookup; never creates.
    pub fn find_child(&self, tag: &Tag) -> Option<Arc<MetricSet>> {
        self.children.get(tag).map(|r| Arc::clone(r.value()))
    }

    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.children.is_empty()
    }

    /// Copy current values into an immutable, sorted tree.
    pub fn snapshot(&self) -> MetricSetSnapshot {
        let metrics = self
            .metrics
            .iter()
            .map(|r| (r.key().clone(), r.value().value()))
            .collect::<BTreeMap<_, _>>();

        // Clone the child handles first so no shard lock is held while recursing.
        let children: Vec<(Tag, Arc<MetricSet>)> = self
            .children
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();

        MetricSetSnapshot::new(
            metrics,
            children
                .into_iter()
                .map(|(tag, set)| (tag, set.snapshot()))
                .collect(),
        )
    }
}
