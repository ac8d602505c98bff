//! Default metric policy for HTTP-style work.
//!
//! Tree produced per bucket:
//!
//! ```text
//! root                       count, elapsed_millis, zombie_count, <key>_count, outstanding
//! ├─ status=<code>           count, elapsed_millis, zombie_count, <key>_count
//! ├─ error=<name>            count, elapsed_millis, zombie_count, <key>_count
//! └─ endpoint=<endpoint>     count, elapsed_millis, zombie_count, <key>_count, outstanding
//!    ├─ status=<code>        ...
//!    └─ error=<name>         ...
//! ```
//!
//! `count` at a node is the number of completions that reached it;
//! `outstanding` is summed over every sampler tick in the window.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use worktrack_core::{Bucket, MetricSet, Result, Tag, Work};

use crate::engine::Builder;

pub const ENDPOINT_TAG: &str = "endpoint";
pub const STATUS_TAG: &str = "status";
pub const ERROR_TAG: &str = "error";

/// Builder preloaded with [`collect`] and [`sample_outstanding`]; add an output and build.
pub fn http_metrics<W: Work>(collector_window: Duration, sampler_window: Duration) -> Builder<W> {
    Builder::new(collector_window)
        .collector(collect::<W>)
        .outstanding(sample_outstanding::<W>, sampler_window)
}

/// Collector: one completed work item.
pub fn collect<W: Work>(bucket: &Bucket, work: &W) -> Result<()> {
    let endpoint_set = bucket.get_metric_set(Tag::new(ENDPOINT_TAG, work.endpoint()));
    add_all_details(&endpoint_set, work)?;
    add_all_details(bucket, work)
}

/// Outstanding sampler: total plus per-endpoint counts.
pub fn sample_outstanding<W: Work>(bucket: &Bucket, outstanding: &[Arc<W>]) -> Result<()> {
    add_outstanding(bucket, outstanding.len())?;

    let mut by_endpoint: BTreeMap<String, usize> = BTreeMap::new();
    for work in outstanding {
        *by_endpoint.entry(work.endpoint()).or_default() += 1;
    }
    for (endpoint, n) in by_endpoint {
        add_outstanding(&bucket.get_metric_set(Tag::new(ENDPOINT_TAG, endpoint)), n)?;
    }
    Ok(())
}

fn add_outstanding(set: &MetricSet, n: usize) -> Result<()> {
    set.long("outstanding")?.add(i64::try_from(n).unwrap_or(i64::MAX));
    Ok(())
}

fn add_all_details<W: Work>(set: &MetricSet, work: &W) -> Result<()> {
    add_details(set, work)?;

    if let Some(status) = work.status_code() {
        add_details(&set.get_metric_set(Tag::new(STATUS_TAG, status)), work)?;
    }
    if let Some(error) = work.error_name() {
        add_details(&set.get_metric_set(Tag::new(ERROR_TAG, error)), work)?;
    }
    Ok(())
}

fn add_details<W: Work>(set: &MetricSet, work: &W) -> Result<()> {
    set.count("count")?.increment();
    set.long("elapsed_millis")?.add(work.elapsed_millis());

    if work.is_zombie() {
        set.count("zombie_count")?.increment();
    }

    for (key, value) in work.context_entries() {
        set.unique(&format!("{key}_count"))?.add(&value);
    }
    Ok(())
}
