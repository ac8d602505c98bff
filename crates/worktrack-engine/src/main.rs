//! worktrack demo server.
//!
//! - Config from `$WORKTRACK_CONFIG` (default `worktrack.yaml`)
//! - Instrumented demo routes under `/v1`, bucket text at `/metrics`
//! - ctrl-c drains the server, then flushes the final window

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use worktrack_core::{Result, WorkTrackError};
use worktrack_engine::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "worktrack-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("WORKTRACK_CONFIG").unwrap_or_else(|_| "worktrack.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .map_err(|e| WorkTrackError::BadConfig(format!("server.listen must be a valid SocketAddr: {e}")))?;

    let state = app_state::AppState::new(cfg)?;
    let engine = state.engine().clone();
    let app = router::build_router(state);

    tracing::info!(%listen, "worktrack-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| WorkTrackError::Internal(format!("bind failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(|e| WorkTrackError::Internal(format!("server failed: {e}")))?;

    engine.shutdown().await
}
