//! Metric aggregation engine.
//!
//! The engine owns the live [`Bucket`], the outstanding set, two clock tasks
//! and one delivery worker:
//! - the collector clock swaps in a fresh bucket every collector window and
//!   queues the rotated one for delivery;
//! - the sampler clock hands a copy of the outstanding set to the outstanding
//!   callback every sampler window, on the blocking pool, writing into the
//!   live bucket;
//! - the delivery worker snapshots queued buckets and hands them to the output
//!   sink one at a time, in rotation order.
//!
//! Writers (`record_completion` and the sampler) clone the current
//! `Arc<Bucket>` under a short read lock and write without holding it. A
//! rotated bucket is only snapshotted once every such clone is dropped, so
//! each write lands entirely in one emitted window and rotation never waits on
//! a writer.

mod builder;
mod outstanding;

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::{Duration, SystemTime};

use futures_util::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use worktrack_core::{Bucket, Result, Work, WorkTrackError};

use crate::output::OutputSink;

pub use builder::{Builder, DEFAULT_COLLECTOR_WINDOW, DEFAULT_SAMPLER_WINDOW};
pub use outstanding::{OutstandingSet, Tracked, WorkId};

/// Records one completed work item into a bucket.
pub type Collector<W> = Arc<dyn Fn(&Bucket, &W) -> Result<()> + Send + Sync>;

/// Records derived metrics for the currently outstanding work.
pub type OutstandingFn<W> = Arc<dyn Fn(&Bucket, &[Arc<W>]) -> Result<()> + Send + Sync>;

/// Poll interval while waiting for in-flight writers to leave a rotated bucket.
const QUIESCE_POLL: Duration = Duration::from_millis(1);

/// Polls between warnings about a rotated bucket that is still referenced (~5 s).
const QUIESCE_WARN_EVERY: u32 = 5_000;

pub struct Engine<W: Work> {
    inner: Arc<Inner<W>>,
}

impl<W: Work> Clone for Engine<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<W: Work> {
    rt: Handle,
    collector_window: Duration,
    sampler_window: Duration,
    collector: Collector<W>,
    outstanding_fn: Option<OutstandingFn<W>>,
    sink: Arc<dyn OutputSink>,
    /// `None` once shut down.
    current: RwLock<Option<Arc<Bucket>>>,
    outstanding: Arc<OutstandingSet<W>>,
    clocks: Mutex<Option<Clocks>>,
    delivery: Mutex<Option<Delivery>>,
}

struct Clocks {
    stop: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

/// A closed window waiting for delivery.
struct Rotated {
    bucket: Arc<Bucket>,
    end: SystemTime,
}

struct Delivery {
    queue: mpsc::UnboundedSender<Rotated>,
    worker: JoinHandle<()>,
}

impl<W: Work> Engine<W> {
    fn start(inner: Inner<W>) -> Self {
        let inner = Arc::new(inner);
        let (stop, _) = watch::channel(false);

        let (queue, pending) = mpsc::unbounded_channel();
        let worker = inner.rt.spawn(delivery_worker(Arc::clone(&inner.sink), pending));
        *inner.delivery.lock().unwrap_or_else(PoisonError::into_inner) = Some(Delivery { queue, worker });

        let mut handles = vec![inner.rt.spawn(collector_clock(
            Arc::downgrade(&inner),
            inner.collector_window,
            stop.subscribe(),
        ))];
        if inner.outstanding_fn.is_some() {
            handles.push(inner.rt.spawn(sampler_clock(
                Arc::downgrade(&inner),
                inner.sampler_window,
                stop.subscribe(),
            )));
        }

        *inner.clocks.lock().unwrap_or_else(PoisonError::into_inner) = Some(Clocks { stop, handles });

        tracing::info!(
            collector_window_ms = inner.collector_window.as_millis() as u64,
            sampler_window_ms = inner.sampler_window.as_millis() as u64,
            sampler = inner.outstanding_fn.is_some(),
            sink = inner.sink.name(),
            "worktrack engine started"
        );

        Self { inner }
    }

    /// Run the collector for one completed work item against the live bucket.
    ///
    /// Errors from the collector (e.g. a variant mismatch) are returned as-is.
    pub fn record_completion(&self, work: &W) -> Result<()> {
        let bucket = self.inner.current_bucket().ok_or(WorkTrackError::EngineClosed)?;
        (self.inner.collector)(bucket.as_ref(), work)
    }

    /// Add work to the outstanding set. Must be matched by one [`Engine::untrack`].
    pub fn track(&self, work: Arc<W>) -> Result<WorkId> {
        if self.is_closed() {
            return Err(WorkTrackError::EngineClosed);
        }
        Ok(self.inner.outstanding.insert(work))
    }

    /// Remove tracked work. Accepted after shutdown so pairs can still close.
    pub fn untrack(&self, id: WorkId) -> Option<Arc<W>> {
        self.inner.outstanding.remove(id)
    }

    /// Track work until the returned guard is dropped.
    pub fn track_scoped(&self, work: Arc<W>) -> Result<Tracked<W>> {
        let id = self.track(Arc::clone(&work))?;
        Ok(Tracked::new(id, work, Arc::clone(&self.inner.outstanding)))
    }

    pub fn outstanding_len(&self) -> usize {
        self.inner.outstanding.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn collector_window(&self) -> Duration {
        self.inner.collector_window
    }

    pub fn sampler_window(&self) -> Duration {
        self.inner.sampler_window
    }

    /// Stop both clocks and flush the current (partial) window.
    ///
    /// Returns once every rotated window and then the final bucket have been
    /// handed to the sink, in order. Later `record_completion`/`track`/`shutdown`
    /// calls fail with `EngineClosed`.
    pub async fn shutdown(&self) -> Result<()> {
        let end = SystemTime::now();
        let last = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(WorkTrackError::EngineClosed)?;

        let clocks = self
            .inner
            .clocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(clocks) = clocks {
            let _ = clocks.stop.send(true);
            for handle in clocks.handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "clock task ended abnormally");
                }
            }
        }

        // clocks are stopped, so nothing else can enqueue behind the final bucket
        let delivery = self
            .inner
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| WorkTrackError::Internal("delivery worker missing".into()))?;
        delivery
            .queue
            .send(Rotated { bucket: last, end })
            .map_err(|_| WorkTrackError::Internal("delivery worker stopped early".into()))?;
        drop(delivery.queue);
        delivery
            .worker
            .await
            .map_err(|e| WorkTrackError::Internal(format!("delivery worker failed: {e}")))?;

        tracing::info!(outstanding = self.outstanding_len(), "worktrack engine shut down");
        Ok(())
    }
}

impl<W: Work> Inner<W> {
    fn current_bucket(&self) -> Option<Arc<Bucket>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn rotate(&self) {
        let end = SystemTime::now();
        let rotated = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            match current.as_mut() {
                Some(bucket) => std::mem::replace(bucket, Arc::new(Bucket::new(end))),
                None => return,
            }
        };
        tracing::debug!(start_millis = rotated.start_millis(), "bucket rotated");

        let delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let queued = delivery.as_ref().map(|d| d.queue.send(Rotated { bucket: rotated, end }));
        if !matches!(queued, Some(Ok(()))) {
            tracing::error!("delivery worker unavailable; window dropped");
        }
    }

    /// Everything one sampler tick needs, cloned so the callback can run off the clock task.
    fn sample_job(&self) -> Option<SampleJob<W>> {
        let f = Arc::clone(self.outstanding_fn.as_ref()?);
        let work = self.outstanding.snapshot();
        let bucket = self.current_bucket()?;
        Some(SampleJob { f, bucket, work })
    }
}

struct SampleJob<W: Work> {
    f: OutstandingFn<W>,
    bucket: Arc<Bucket>,
    work: Vec<Arc<W>>,
}

impl<W: Work> SampleJob<W> {
    /// Run the callback on the blocking pool so a slow sampler never holds a runtime worker.
    async fn run(self) {
        let SampleJob { f, bucket, work } = self;
        let outcome = tokio::task::spawn_blocking(move || f(bucket.as_ref(), &work[..])).await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(code = e.code().as_str(), error = %e, "outstanding sampler failed");
            }
            Err(e) if e.is_panic() => tracing::error!("outstanding sampler panicked"),
            Err(e) => tracing::warn!(error = %e, "outstanding sampler task cancelled"),
        }
    }
}

async fn delivery_worker(sink: Arc<dyn OutputSink>, mut pending: mpsc::UnboundedReceiver<Rotated>) {
    while let Some(Rotated { bucket, end }) = pending.recv().await {
        deliver(sink.as_ref(), bucket, end).await;
    }
}

async fn deliver(sink: &dyn OutputSink, bucket: Arc<Bucket>, end: SystemTime) {
    let bucket = quiesce(bucket).await;
    let snapshot = Arc::new(bucket.snapshot(end));
    let start_millis = snapshot.start_millis;

    match AssertUnwindSafe(sink.deliver(snapshot)).catch_unwind().await {
        Ok(Ok(())) => tracing::debug!(sink = sink.name(), start_millis, "bucket delivered"),
        Ok(Err(e)) => tracing::warn!(
            sink = sink.name(),
            start_millis,
            code = e.code().as_str(),
            error = %e,
            "bucket delivery failed; window dropped"
        ),
        Err(_) => tracing::error!(sink = sink.name(), start_millis, "output sink panicked; window dropped"),
    }
}

/// Wait until no writer holds the rotated bucket any more.
async fn quiesce(mut bucket: Arc<Bucket>) -> Bucket {
    let mut polls: u32 = 0;
    loop {
        match Arc::try_unwrap(bucket) {
            Ok(b) => return b,
            Err(shared) => {
                polls = polls.wrapping_add(1);
                if polls % QUIESCE_WARN_EVERY == 0 {
                    tracing::warn!(
                        start_millis = shared.start_millis(),
                        holders = Arc::strong_count(&shared) - 1,
                        waited_ms = u64::from(polls) * QUIESCE_POLL.as_millis() as u64,
                        "rotated bucket still held by a writer; delivery waiting"
                    );
                }
                bucket = shared;
                tokio::time::sleep(QUIESCE_POLL).await;
            }
        }
    }
}

async fn collector_clock<W: Work>(inner: Weak<Inner<W>>, period: Duration, mut stop: watch::Receiver<bool>) {
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let Some(inner) = inner.upgrade() else { break; };
                inner.rotate();
            }
            _ = stop.changed() => break,
        }
    }
}

async fn sampler_clock<W: Work>(inner: Weak<Inner<W>>, period: Duration, mut stop: watch::Receiver<bool>) {
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let Some(inner) = inner.upgrade() else { break; };
                let job = inner.sample_job();
                drop(inner);
                if let Some(job) = job {
                    job.run().await;
                }
            }
            _ = stop.changed() => break,
        }
    }
}
