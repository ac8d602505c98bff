use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use worktrack_core::{BucketSnapshot, Result};

use super::OutputSink;

/// Keeps only the most recently emitted bucket (backs the `/metrics` route).
pub struct LatestSink {
    tx: watch::Sender<Option<Arc<BucketSnapshot>>>,
}

impl LatestSink {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn latest(&self) -> Option<Arc<BucketSnapshot>> {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every emitted bucket.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<BucketSnapshot>>> {
        self.tx.subscribe()
    }
}

impl Default for LatestSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputSink for LatestSink {
    fn name(&self) -> &'static str {
        "latest"
    }

    async fn deliver(&self, bucket: Arc<BucketSnapshot>) -> Result<()> {
        self.tx.send_replace(Some(bucket));
        Ok(())
    }
}
