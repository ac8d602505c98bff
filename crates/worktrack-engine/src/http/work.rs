use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use worktrack_core::{ContextEntries, Work};

/// One HTTP request as seen by the engine.
///
/// Handlers reach it through `Extension<Arc<HttpWork>>` to add context entries
/// or an error name; the middleware sets the status code.
#[derive(Debug)]
pub struct HttpWork {
    endpoint: String,
    started: Instant,
    zombie_after: Duration,
    status: Mutex<Option<String>>,
    error: Mutex<Option<String>>,
    context: Mutex<ContextEntries>,
}

impl HttpWork {
    pub fn new(endpoint: impl Into<String>, zombie_after: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            started: Instant::now(),
            zombie_after,
            status: Mutex::new(None),
            error: Mutex::new(None),
            context: Mutex::new(ContextEntries::new()),
        }
    }

    pub fn set_status(&self, status: impl Into<String>) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = Some(status.into());
    }

    pub fn set_error(&self, name: impl Into<String>) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = Some(name.into());
    }

    /// Record a context entry. Overwriting a key keeps its first position.
    pub fn put_context(&self, key: impl Into<String>, value: impl Into<String>) {
        self.context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Work for HttpWork {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    fn elapsed_millis(&self) -> i64 {
        i64::try_from(self.elapsed().as_millis()).unwrap_or(i64::MAX)
    }

    fn status_code(&self) -> Option<String> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn is_zombie(&self) -> bool {
        self.elapsed() > self.zombie_after
    }

    fn context_entries(&self) -> ContextEntries {
        self.context.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn error_name(&self) -> Option<String> {
        self.error.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
