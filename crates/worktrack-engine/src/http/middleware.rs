use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::engine::Engine;

use super::HttpWork;

/// State for [`instrument`].
#[derive(Clone)]
pub struct Instrumentation {
    pub engine: Engine<HttpWork>,
    pub zombie_after: Duration,
}

/// Track the request while it runs, then record its completion.
///
/// Install with `route_layer` so the matched route template (not the raw path)
/// becomes the endpoint.
pub async fn instrument(State(inst): State<Instrumentation>, mut req: Request, next: Next) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let work = Arc::new(HttpWork::new(endpoint, inst.zombie_after));
    work.put_context("method", req.method().as_str());
    req.extensions_mut().insert(Arc::clone(&work));

    let tracked = match inst.engine.track_scoped(Arc::clone(&work)) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::debug!(code = e.code().as_str(), "request not tracked");
            None
        }
    };

    let response = next.run(req).await;

    work.set_status(response.status().as_str());
    if let Err(e) = inst.engine.record_completion(&work) {
        tracing::warn!(code = e.code().as_str(), error = %e, "record completion failed");
    }
    drop(tracked);

    response
}
