use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        InsertedResponse, PageQuery, SignInRequest, SignUpRequest, TokenResponse,
        UpdateProfileRequest,
    },
    extractors::Identity,
    repo_types::User,
    services,
};
use crate::{error::AppError, state::AppState};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/sign-up", post(sign_up))
        .route("/users/sign-in", post(sign_in))
}

/// Routes that expect an `Identity`. The caller wraps them in `require_auth`.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user))
        .route("/me", get(get_me).patch(update_me))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<InsertedResponse>), AppError> {
    let inserted_id = services::sign_up(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(InsertedResponse { inserted_id })))
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let token = services::sign_in(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _caller: Identity,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = services::list(&state, q.page.unwrap_or(1)).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _caller: Identity,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, AppError> {
    Ok(Json(services::get_by_id(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<User>, AppError> {
    Ok(Json(services::get_by_id(&state, identity.user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<StatusCode, AppError> {
    services::update(&state, identity.user_id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
