use std::sync::Arc;

use async_trait::async_trait;

use worktrack_core::{BucketSnapshot, Result, WorkTrackError};

use super::OutputSink;

/// Writes each bucket as one JSON `info` event on target `worktrack::bucket`.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl OutputSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, bucket: Arc<BucketSnapshot>) -> Result<()> {
        let json = serde_json::to_string(&bucket.root)
            .map_err(|e| WorkTrackError::Sink(format!("json encode failed: {e}")))?;
        tracing::info!(
            target: "worktrack::bucket",
            start_millis = bucket.start_millis,
            end_millis = bucket.end_millis,
            metrics = %json,
            "bucket emitted"
        );
        Ok(())
    }
}
