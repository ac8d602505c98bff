//! Shared error type across worktrack crates.

use thiserror::Error;

use crate::metric::MetricKind;

/// Stable error codes (used as log fields and asserted by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A metric name was requested under a different variant.
    VariantMismatch,
    /// The engine has been shut down.
    EngineClosed,
    /// No async runtime to drive the clocks.
    NoRuntime,
    /// Invalid configuration.
    BadConfig,
    /// Output sink failed to deliver a bucket.
    Sink,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::VariantMismatch => "VARIANT_MISMATCH",
            ErrorCode::EngineClosed => "ENGINE_CLOSED",
            ErrorCode::NoRuntime => "NO_RUNTIME",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Sink => "SINK",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WorkTrackError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum WorkTrackError {
    #[error("metric `{name}` is a {existing} metric, requested as {requested}")]
    VariantMismatch {
        name: String,
        existing: MetricKind,
        requested: MetricKind,
    },
    #[error("engine closed")]
    EngineClosed,
    #[error("no tokio runtime available to drive the engine clocks")]
    NoRuntime,
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("sink: {0}")]
    Sink(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl WorkTrackError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            WorkTrackError::VariantMismatch { .. } => ErrorCode::VariantMismatch,
            WorkTrackError::EngineClosed => ErrorCode::EngineClosed,
            WorkTrackError::NoRuntime => ErrorCode::NoRuntime,
            WorkTrackError::BadConfig(_) => ErrorCode::BadConfig,
            WorkTrackError::Sink(_) => ErrorCode::Sink,
            WorkTrackError::Internal(_) => ErrorCode::Internal,
        }
    }
}
