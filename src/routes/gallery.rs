//! Media gallery listing backed by the `FarmGallery` table.
//!
//! Read-only: uploads go through Supabase storage directly and are out of
//! scope for this service.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tracing::error;

use super::AppState;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/gallery", get(list))
}

/// `GET /gallery` — stored media items, newest first.
async fn list(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    match state.supabase.list_gallery().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => {
            error!("Failed to list gallery: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to list gallery"),
            )
                .into_response()
        }
    }
}
