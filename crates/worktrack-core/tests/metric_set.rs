//! MetricSet creation, idempotence and variant checks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;

use worktrack_core::{CountMetric, LongMetric, MetricKind, MetricSet, MetricValue, Tag, UniqueMetric};

#[test]
fn same_name_returns_same_metric() {
    let set = MetricSet::new();
    set.get_metric::<CountMetric>("count").unwrap().increment();
    set.get_metric::<CountMetric>("count").unwrap().increment();

    assert_eq!(set.metric_count(), 1);
    assert_eq!(set.count("count").unwrap().get(), 2);
}

#[test]
fn variant_mismatch_fails_fast() {
    let set = MetricSet::new();
    set.count("elapsed_millis").unwrap();

    let err = set.get_metric::<LongMetric>("elapsed_millis").expect_err("must fail");
    assert_eq!(err.code().as_str(), "VARIANT_MISMATCH");
    match err {
        worktrack_core::WorkTrackError::VariantMismatch { name, existing, requested } => {
            assert_eq!(name, "elapsed_millis");
            assert_eq!(existing, MetricKind::Count);
            assert_eq!(requested, MetricKind::Long);
        }
        other => panic!("unexpected error: {other}"),
    }

    // the first registration is kept
    assert_eq!(set.metric("elapsed_millis").unwrap().kind(), MetricKind::Count);
}

#[test]
fn unique_metric_deduplicates() {
    let set = MetricSet::new();
    set.unique("user_count").unwrap().add("42");
    set.unique("user_count").unwrap().add("42");
    set.unique("user_count").unwrap().add("7");

    assert_eq!(set.get_metric::<UniqueMetric>("user_count").unwrap().get(), 2);
}

#[test]
fn long_metric_sums_signed_values() {
    let set = MetricSet::new();
    let m = set.long("outstanding").unwrap();
    m.add(5);
    m.add(-2);
    assert_eq!(m.get(), 3);
}

#[test]
fn equal_tags_share_a_child() {
    let set = MetricSet::new();
    let a = set.get_metric_set(Tag::new("endpoint", "/orders"));
    let b = set.child("endpoint", "/orders");
    assert!(Arc::ptr_eq(&a, &b));

    let other = set.child("endpoint", "/users");
    assert!(!Arc::ptr_eq(&a, &other));
    assert_eq!(set.child_count(), 2);
}

#[test]
fn racing_creators_observe_one_instance() {
    const THREADS: usize = 16;

    let set = Arc::new(MetricSet::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let set = Arc::clone(&set);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let child = set.child("endpoint", "/orders");
                let count = child.count("count").unwrap();
                count.increment();
                (child, count)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let (first_child, first_count) = &results[0];
    for (child, count) in &results {
        assert!(Arc::ptr_eq(first_child, child));
        assert!(Arc::ptr_eq(first_count, count));
    }
    assert_eq!(set.child_count(), 1);
    assert_eq!(first_count.get(), THREADS as u64);
}

#[test]
fn snapshot_is_sorted_and_detached() {
    let set = MetricSet::new();
    set.count("count").unwrap().increment();
    set.child("endpoint", "/b").long("elapsed_millis").unwrap().add(10);
    set.child("endpoint", "/a").long("elapsed_millis").unwrap().add(20);
    set.child("endpoint", "/a").child("status", "500").count("count").unwrap().increment();

    let snap = set.snapshot();

    // later writes do not leak into the snapshot
    set.count("count").unwrap().increment();

    assert_eq!(snap.metric("count"), Some(MetricValue::Count(1)));
    let tags: Vec<_> = snap.children.iter().map(|c| c.tag.value().to_string()).collect();
    assert_eq!(tags, vec!["/a", "/b"]);
    assert_eq!(
        snap.path(&[("endpoint", "/a"), ("status", "500")]).unwrap().metric("count"),
        Some(MetricValue::Count(1))
    );
    assert!(snap.path(&[("endpoint", "/a"), ("status", "200")]).is_none());
}

#[test]
fn snapshot_serializes_variant_and_value() {
    let set = MetricSet::new();
    set.unique("user_count").unwrap().add("42");

    let json = serde_json::to_value(set.snapshot()).unwrap();
    assert_eq!(json["metrics"]["user_count"]["kind"], "unique");
    assert_eq!(json["metrics"]["user_count"]["value"], 1);
    assert!(json.get("children").is_none());
}
