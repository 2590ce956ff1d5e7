#![deny(clippy::print_stdout, clippy::print_stderr)]

//! §6 HTTP surface: the small set of endpoints that front the
//! reconciliation service and the workflow orchestrator. Thin by design —
//! every handler validates the request shape and delegates straight to
//! `vault-recon-service` / `vault-recon-workflow`.

mod dto;
mod error;
mod reconciliation;
mod state;
mod workflows;

pub use state::AppState;

use axum::routing::get;
use axum::routing::post;
use axum::Router;

/// Builds the full router (§6 "the only endpoints required"). Held apart
/// from `AppState` construction so callers can mount it under a prefix, or
/// layer tracing/middleware around it, before binding a listener.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route(
            "/v2/reconciliation/addresses/{address}/chain/{chainAlias}/reconcile",
            post(reconciliation::create_job),
        )
        .route(
            "/v2/reconciliation/addresses/{address}/chain/{chainAlias}/reconciliation-jobs",
            get(reconciliation::list_jobs),
        )
        .route(
            "/v2/reconciliation/reconciliation-jobs/{jobId}",
            get(reconciliation::get_job),
        )
        .route("/v2/workflows/", post(workflows::create_workflow))
        .route("/v2/workflows/{id}", get(workflows::get_workflow))
        .route("/v2/workflows/{id}/history", get(workflows::get_history))
        .route("/v2/workflows/{id}/review", post(workflows::review))
        .route("/v2/workflows/{id}/confirm", post(workflows::confirm))
        .route("/v2/workflows/{id}/approve", post(workflows::approve))
        .route("/v2/workflows/{id}/reject", post(workflows::reject))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Binds `addr` and serves the router until the returned future is dropped
/// or a fatal I/O error occurs. Left to the binary to race against a
/// shutdown signal.
pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, router(state)).await
}
