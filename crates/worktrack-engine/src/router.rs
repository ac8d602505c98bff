//! Axum router wiring.
//!
//! Demo routes under `/v1` are instrumented; operational routes are not.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    middleware,
    routing::get,
    Extension, Router,
};

use crate::{app_state::AppState, http::HttpWork, ops};

pub fn build_router(state: AppState) -> Router {
    let instrumented = Router::new()
        .route("/v1/sleep/:ms", get(sleep))
        .route("/v1/fail", get(fail))
        .route_layer(middleware::from_fn_with_state(
            state.instrumentation(),
            crate::http::instrument,
        ));

    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
        .merge(instrumented)
}

/// Copy the caller's `x-user` header into the work context.
fn capture_user(headers: &HeaderMap, work: &HttpWork) {
    if let Some(user) = headers.get("x-user").and_then(|v| v.to_str().ok()) {
        work.put_context("user", user);
    }
}

async fn sleep(
    Path(ms): Path<u64>,
    headers: HeaderMap,
    Extension(work): Extension<Arc<HttpWork>>,
) -> &'static str {
    capture_user(&headers, &work);
    tokio::time::sleep(Duration::from_millis(ms.min(60_000))).await;
    "done"
}

async fn fail(headers: HeaderMap, Extension(work): Extension<Arc<HttpWork>>) -> (StatusCode, &'static str) {
    capture_user(&headers, &work);
    work.set_error("DemoFailure");
    (StatusCode::INTERNAL_SERVER_ERROR, "failed")
}
