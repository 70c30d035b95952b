mod dto;
pub mod handlers;
mod repo;
mod repo_types;
pub mod services;

use crate::{auth::middleware::require_auth, state::AppState};
use axum::{middleware::from_fn_with_state, Router};

pub fn router(state: &AppState) -> Router<AppState> {
    handlers::protected_routes()
        .route_layer(from_fn_with_state(state.tokens.clone(), require_auth))
}
