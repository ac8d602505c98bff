use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use worktrack_core::{BucketSnapshot, Result, WorkTrackError};

use super::OutputSink;

/// Forwards buckets into a bounded channel with `try_send`.
///
/// A full or closed channel fails that window's delivery; the engine only logs it.
pub struct ChannelSink {
    tx: mpsc::Sender<Arc<BucketSnapshot>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Arc<BucketSnapshot>>) -> Self {
        Self { tx }
    }

    /// Sink plus its receiving half.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Arc<BucketSnapshot>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl OutputSink for ChannelSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn deliver(&self, bucket: Arc<BucketSnapshot>) -> Result<()> {
        self.tx.try_send(bucket).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => WorkTrackError::Sink("channel full".into()),
            mpsc::error::TrySendError::Closed(_) => WorkTrackError::Sink("channel closed".into()),
        })
    }
}
