//! Output sinks receiving one frozen bucket per collector window.
//!
//! Delivery is fire-and-forget: the engine spawns one task per bucket, logs a
//! failed or panicking delivery and moves on. Nothing is retried.

mod channel;
mod latest;
mod log;

use std::sync::Arc;

use async_trait::async_trait;

use worktrack_core::{BucketSnapshot, Result};

pub use channel::ChannelSink;
pub use latest::LatestSink;
pub use log::LogSink;

#[async_trait]
pub trait OutputSink: Send + Sync + 'static {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    async fn deliver(&self, bucket: Arc<BucketSnapshot>) -> Result<()>;
}

/// Adapts a synchronous closure into a sink.
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F>
where
    F: Fn(Arc<BucketSnapshot>) -> Result<()> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> OutputSink for FnSink<F>
where
    F: Fn(Arc<BucketSnapshot>) -> Result<()> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "fn"
    }

    async fn deliver(&self, bucket: Arc<BucketSnapshot>) -> Result<()> {
        (self.f)(bucket)
    }
}

/// Discards every bucket.
#[derive(Debug, Default)]
pub struct NoopSink;

#[async_trait]
impl OutputSink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn deliver(&self, _bucket: Arc<BucketSnapshot>) -> Result<()> {
        Ok(())
    }
}

/// Delivers to every inner sink; one failing sink does not stop the others.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn OutputSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl OutputSink for FanoutSink {
    fn name(&self) -> &'static str {
        "fanout"
    }

    async fn deliver(&self, bucket: Arc<BucketSnapshot>) -> Result<()> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(Arc::clone(&bucket)).await {
                tracing::warn!(sink = sink.name(), code = e.code().as_str(), error = %e, "fanout member failed");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
