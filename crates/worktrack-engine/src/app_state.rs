//! Shared application state for the worktrack demo server.
//!
//! Owns the engine wired with the default HTTP metric policy and the sinks
//! selected by config.

use std::sync::Arc;

use worktrack_core::{BucketSnapshot, Result};

use crate::config::{OutputKind, WorkTrackConfig};
use crate::defaults;
use crate::engine::Engine;
use crate::http::{HttpWork, Instrumentation};
use crate::output::{FanoutSink, LatestSink, LogSink, OutputSink};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    engine: Engine<HttpWork>,
}

struct AppStateInner {
    cfg: WorkTrackConfig,
    latest: Arc<LatestSink>,
}

impl AppState {
    /// Build the engine and its sinks. Must run inside a tokio runtime.
    pub fn new(cfg: WorkTrackConfig) -> Result<Self> {
        let latest = Arc::new(LatestSink::new());

        let mut sink = FanoutSink::new().with(Arc::clone(&latest) as Arc<dyn OutputSink>);
        if cfg.output.kind == OutputKind::Log {
            sink = sink.with(Arc::new(LogSink));
        }

        let engine = defaults::http_metrics::<HttpWork>(
            cfg.engine.collector_window(),
            cfg.engine.sampler_window(),
        )
        .output(Arc::new(sink))
        .build()?;

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, latest }),
            engine,
        })
    }

    pub fn cfg(&self) -> &WorkTrackConfig {
        &self.inner.cfg
    }

    pub fn engine(&self) -> &Engine<HttpWork> {
        &self.engine
    }

    /// Last bucket emitted by the engine, if any window has closed yet.
    pub fn latest(&self) -> Option<Arc<BucketSnapshot>> {
        self.inner.latest.latest()
    }

    pub fn instrumentation(&self) -> Instrumentation {
        Instrumentation {
            engine: self.engine.clone(),
            zombie_after: self.inner.cfg.engine.zombie_threshold(),
        }
    }
}
