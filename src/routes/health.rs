// src/routes/health.rs
//! API health check endpoint for the greenwatch service.
//!
//! Defines the `/health` route used by container orchestrators and CI
//! pipelines to verify that the service is up and able to respond. It is
//! deliberately lightweight and does not touch the backend, so a Supabase
//! outage never fails a liveness probe.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Handle `GET /health`.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Create a subrouter containing the `/health` route.
///
/// Generic over the application state so it merges cleanly with the
/// gateway router regardless of the state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
