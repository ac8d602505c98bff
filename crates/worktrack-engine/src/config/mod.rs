//! Engine/server config loader (strict parsing).

pub mod schema;

use std::fs;

use worktrack_core::error::{Result, WorkTrackError};

pub use schema::{EngineSection, OutputKind, OutputSection, ServerSection, WorkTrackConfig};

pub fn load_from_file(path: &str) -> Result<WorkTrackConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| WorkTrackError::BadConfig(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<WorkTrackConfig> {
    let cfg: WorkTrackConfig = serde_yaml::from_str(s)
        .map_err(|e| WorkTrackError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
