//! worktrack engine library entry.
//!
//! The metric aggregation engine (clocks, bucket rotation, outstanding set),
//! its output sinks and config, plus the axum adapter and demo server wiring
//! used by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod http;
pub mod obs;
pub mod ops;
pub mod output;
pub mod router;

pub use engine::{Builder, Engine, Tracked, WorkId};
