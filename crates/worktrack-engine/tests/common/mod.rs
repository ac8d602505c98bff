//! Fixed-value `Work` used by engine tests.

#![allow(dead_code)]

use worktrack_core::{ContextEntries, Work};

#[derive(Debug, Clone, Default)]
pub struct TestWork {
    pub endpoint: String,
    pub elapsed_millis: i64,
    pub status: Option<String>,
    pub error: Option<String>,
    pub zombie: bool,
    pub context: ContextEntries,
}

impl TestWork {
    pub fn new(endpoint: &str, elapsed_millis: i64) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            elapsed_millis,
            ..Default::default()
        }
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn error(mut self, name: &str) -> Self {
        self.error = Some(name.to_string());
        self
    }

    pub fn zombie(mut self) -> Self {
        self.zombie = true;
        self
    }

    pub fn context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }
}

impl Work for TestWork {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    fn elapsed_millis(&self) -> i64 {
        self.elapsed_millis
    }

    fn status_code(&self) -> Option<String> {
        self.status.clone()
    }

    fn is_zombie(&self) -> bool {
        self.zombie
    }

    fn context_entries(&self) -> ContextEntries {
        self.context.clone()
    }

    fn error_name(&self) -> Option<String> {
        self.error.clone()
    }
}
