//! Monitoring status endpoint.
//!
//! `GET /status` is the service's stand-in for a UI refresh: it serves the
//! snapshot the monitor published after its most recent successful fetch,
//! together with the name of the active vegetation profile. `latest` is
//! null until the first fetch succeeds.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;
use crate::monitor::StatusSnapshot;

// ---

#[derive(Serialize)]
struct StatusResponse {
    active_profile: Option<String>,
    latest: Option<StatusSnapshot>,
}

async fn handler(State(state): State<AppState>) -> Json<StatusResponse> {
    // ---
    Json(StatusResponse {
        active_profile: state.active.get().await.map(|p| p.name),
        latest: state.status.latest().await,
    })
}

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/status", get(handler))
}
