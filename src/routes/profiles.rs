//! Vegetation profile CRUD and activation.
//!
//! Profiles live in the backend's `Vegetationtbl`; the *active* profile is
//! process-local state shared with the monitor. At most one profile is
//! active at a time, and activating, updating, or deleting keeps the
//! monitor's copy consistent.
//!
//! Threshold pairs are validated (`min <= max`) before anything reaches
//! the backend; violations come back as 422 with the offending pair.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use tracing::{error, info};

use super::AppState;
use crate::VegetationProfile;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/profiles", get(list).post(create))
        .route("/profiles/active", get(active).delete(deactivate))
        .route("/profiles/{id}", axum::routing::patch(update).delete(remove))
        .route("/profiles/{id}/activate", put(activate))
}

async fn list(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    match state.supabase.list_profiles().await {
        Ok(profiles) => (StatusCode::OK, Json(profiles)).into_response(),
        Err(e) => {
            error!("Failed to list profiles: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to list profiles"),
            )
                .into_response()
        }
    }
}

async fn create(
    State(state): State<AppState>,
    Json(profile): Json<VegetationProfile>,
) -> impl IntoResponse {
    // ---
    if let Err(reason) = profile.validate() {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(reason)).into_response();
    }

    match state.supabase.create_profile(&profile).await {
        Ok(()) => {
            info!("Created profile '{}'", profile.name);
            StatusCode::CREATED.into_response()
        }
        Err(e) => {
            error!("Failed to create profile: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to create profile"),
            )
                .into_response()
        }
    }
}

async fn update(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(mut profile): Json<VegetationProfile>,
) -> impl IntoResponse {
    // ---
    if let Err(reason) = profile.validate() {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(reason)).into_response();
    }
    profile.id = Some(id);

    match state.supabase.update_profile(id, &profile).await {
        Ok(()) => {
            // Keep the monitor's copy in sync when the active profile changes
            if state.active.get().await.and_then(|p| p.id) == Some(id) {
                state.active.set(Some(profile.clone())).await;
                info!("Updated active profile '{}'", profile.name);
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!("Failed to update profile {id}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to update profile"),
            )
                .into_response()
        }
    }
}

async fn remove(Path(id): Path<i64>, State(state): State<AppState>) -> impl IntoResponse {
    // ---
    match state.supabase.delete_profile(id).await {
        Ok(()) => {
            // A deleted profile cannot stay active
            if state.active.get().await.and_then(|p| p.id) == Some(id) {
                state.active.set(None).await;
                info!("Deactivated deleted profile {id}");
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!("Failed to delete profile {id}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to delete profile"),
            )
                .into_response()
        }
    }
}

async fn activate(Path(id): Path<i64>, State(state): State<AppState>) -> impl IntoResponse {
    // ---
    match state.supabase.profile_by_id(id).await {
        Ok(Some(profile)) => {
            info!("Activating profile '{}'", profile.name);
            state.active.set(Some(profile)).await;
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, Json("No such profile")).into_response(),
        Err(e) => {
            error!("Failed to activate profile {id}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to activate profile"),
            )
                .into_response()
        }
    }
}

async fn active(State(state): State<AppState>) -> Json<Option<VegetationProfile>> {
    // ---
    Json(state.active.get().await)
}

async fn deactivate(State(state): State<AppState>) -> StatusCode {
    // ---
    state.active.set(None).await;
    info!("Monitoring deactivated (no active profile)");
    StatusCode::NO_CONTENT
}
