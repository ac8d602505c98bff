use std::time::Duration;

use serde::Deserialize;
use worktrack_core::error::{Result, WorkTrackError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkTrackConfig {
    pub version: u32,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub output: OutputSection,
}

impl WorkTrackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WorkTrackError::BadConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.engine.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default = "default_collector_window_ms")]
    pub collector_window_ms: u64,

    #[serde(default = "default_sampler_window_ms")]
    pub sampler_window_ms: u64,

    /// Work running longer than this is flagged as a zombie.
    #[serde(default = "default_zombie_threshold_ms")]
    pub zombie_threshold_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            collector_window_ms: default_collector_window_ms(),
            sampler_window_ms: default_sampler_window_ms(),
            zombie_threshold_ms: default_zombie_threshold_ms(),
        }
    }
}

impl EngineSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=3_600_000).contains(&self.collector_window_ms) {
            return Err(WorkTrackError::BadConfig(
                "engine.collector_window_ms must be between 100 and 3600000".into(),
            ));
        }
        if !(10..=600_000).contains(&self.sampler_window_ms) {
            return Err(WorkTrackError::BadConfig(
                "engine.sampler_window_ms must be between 10 and 600000".into(),
            ));
        }
        if self.sampler_window_ms > self.collector_window_ms {
            return Err(WorkTrackError::BadConfig(
                "engine.sampler_window_ms must not exceed collector_window_ms".into(),
            ));
        }
        if self.zombie_threshold_ms < 1000 {
            return Err(WorkTrackError::BadConfig(
                "engine.zombie_threshold_ms must be at least 1000".into(),
            ));
        }
        Ok(())
    }

    pub fn collector_window(&self) -> Duration {
        Duration::from_millis(self.collector_window_ms)
    }

    pub fn sampler_window(&self) -> Duration {
        Duration::from_millis(self.sampler_window_ms)
    }

    pub fn zombie_threshold(&self) -> Duration {
        Duration::from_millis(self.zombie_threshold_ms)
    }
}

fn default_collector_window_ms() -> u64 {
    30_000
}
fn default_sampler_window_ms() -> u64 {
    1_000
}
fn default_zombie_threshold_ms() -> u64 {
    300_000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// One tracing event per bucket.
    #[default]
    Log,
    /// Only the `/metrics` route sees buckets.
    None,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub kind: OutputKind,
}
