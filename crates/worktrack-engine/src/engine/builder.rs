use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::runtime::Handle;

use worktrack_core::{Bucket, BucketSnapshot, Result, Work, WorkTrackError};

use super::{Collector, Engine, Inner, OutstandingFn, OutstandingSet};
use crate::config::EngineSection;
use crate::output::{FnSink, OutputSink};

pub const DEFAULT_COLLECTOR_WINDOW: Duration = Duration::from_secs(30);
pub const DEFAULT_SAMPLER_WINDOW: Duration = Duration::from_secs(1);

/// Assembles an [`Engine`] from its callbacks, sink and windows.
///
/// ```ignore
/// let engine = Builder::<MyWork>::new(Duration::from_secs(30))
///     .collector(|bucket, work| {
///         bucket.count("count")?.increment();
///         Ok(())
///     })
///     .outstanding(|bucket, outstanding| {
///         bucket.long("outstanding")?.add(outstanding.len() as i64);
///         Ok(())
///     }, Duration::from_secs(1))
///     .output(Arc::new(LogSink))
///     .build()?;
/// ```
pub struct Builder<W: Work> {
    collector_window: Duration,
    sampler_window: Duration,
    collector: Option<Collector<W>>,
    outstanding: Option<OutstandingFn<W>>,
    sink: Option<Arc<dyn OutputSink>>,
}

impl<W: Work> Builder<W> {
    pub fn new(collector_window: Duration) -> Self {
        Self {
            collector_window,
            sampler_window: DEFAULT_SAMPLER_WINDOW,
            collector: None,
            outstanding: None,
            sink: None,
        }
    }

    /// Windows taken from the `engine` config section.
    pub fn from_config(cfg: &EngineSection) -> Self {
        Self::new(cfg.collector_window()).sampler_window(cfg.sampler_window())
    }

    pub fn sampler_window(mut self, window: Duration) -> Self {
        self.sampler_window = window;
        self
    }

    pub fn collector<F>(mut self, f: F) -> Self
    where
        F: Fn(&Bucket, &W) -> Result<()> + Send + Sync + 'static,
    {
        self.collector = Some(Arc::new(f));
        self
    }

    /// Install the outstanding callback and its sampling window.
    pub fn outstanding<F>(mut self, f: F, sampler_window: Duration) -> Self
    where
        F: Fn(&Bucket, &[Arc<W>]) -> Result<()> + Send + Sync + 'static,
    {
        self.outstanding = Some(Arc::new(f));
        self.sampler_window = sampler_window;
        self
    }

    pub fn output(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn output_fn<F>(self, f: F) -> Self
    where
        F: Fn(Arc<BucketSnapshot>) -> Result<()> + Send + Sync + 'static,
    {
        self.output(Arc::new(FnSink::new(f)))
    }

    /// Validate and start the clocks on the current tokio runtime.
    pub fn build(self) -> Result<Engine<W>> {
        if self.collector_window.is_zero() {
            return Err(WorkTrackError::BadConfig("collector window must be non-zero".into()));
        }
        if self.outstanding.is_some() && self.sampler_window.is_zero() {
            return Err(WorkTrackError::BadConfig("sampler window must be non-zero".into()));
        }
        let collector = self
            .collector
            .ok_or_else(|| WorkTrackError::BadConfig("collector callback is required".into()))?;
        let sink = self
            .sink
            .ok_or_else(|| WorkTrackError::BadConfig("output sink is required".into()))?;
        let rt = Handle::try_current().map_err(|_| WorkTrackError::NoRuntime)?;

        Ok(Engine::start(Inner {
            rt,
            collector_window: self.collector_window,
            sampler_window: self.sampler_window,
            collector,
            outstanding_fn: self.outstanding,
            sink,
            current: RwLock::new(Some(Arc::new(Bucket::starting_now()))),
            outstanding: Arc::new(OutstandingSet::new()),
            clocks: Mutex::new(None),
            delivery: Mutex::new(None),
        }))
    }
}

impl<W: Work> Default for Builder<W> {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTOR_WINDOW)
    }
}
