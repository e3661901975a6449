use axum::Router;

use crate::monitor::{ActiveProfile, StatusBoard};
use crate::supabase::SupabaseClient;

mod gallery;
mod health;
mod history;
mod profiles;
mod status;

// ---

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    // ---
    pub supabase: SupabaseClient,
    pub active: ActiveProfile,
    pub status: StatusBoard,
}

pub fn router(supabase: SupabaseClient, active: ActiveProfile, status: StatusBoard) -> Router {
    // ---
    Router::new()
        .merge(health::router())
        .merge(status::router())
        .merge(profiles::router())
        .merge(history::router())
        .merge(gallery::router())
        .with_state(AppState {
            supabase,
            active,
            status,
        })
}
