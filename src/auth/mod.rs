use crate::state::AppState;
use axum::{middleware::from_fn_with_state, Router};

mod claims;
pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
mod repo;
mod repo_types;
pub mod services;

pub use extractors::Identity;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().merge(handlers::public_routes()).merge(
        handlers::protected_routes()
            .route_layer(from_fn_with_state(state.tokens.clone(), middleware::require_auth)),
    )
}
