//! History log endpoints backed by the `FarmHistory` table.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tracing::error;

use super::AppState;
use crate::HistoryEntry;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/history", get(list).post(create))
}

/// `GET /history` — entries newest first, as ordered by the backend.
async fn list(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    match state.supabase.list_history().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            error!("Failed to list history: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to list history"),
            )
                .into_response()
        }
    }
}

async fn create(
    State(state): State<AppState>,
    Json(entry): Json<HistoryEntry>,
) -> impl IntoResponse {
    // ---
    match state.supabase.add_history(&entry).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => {
            error!("Failed to add history entry: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to add history entry"),
            )
                .into_response()
        }
    }
}
