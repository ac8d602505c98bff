//! axum adapter: request-scoped [`HttpWork`] and the `instrument` middleware.

mod middleware;
mod work;

pub use middleware::{instrument, Instrumentation};
pub use work::HttpWork;
