use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateListingRequest, Listing},
    services,
};
use crate::{
    auth::{
        dto::{InsertedResponse, PageQuery},
        Identity,
    },
    error::AppError,
    state::AppState,
};

pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me/motorcycles", get(list_mine).post(create_listing))
}

#[instrument(skip(state, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<InsertedResponse>), AppError> {
    let inserted_id = services::create(&state, identity, payload).await?;
    Ok((StatusCode::CREATED, Json(InsertedResponse { inserted_id })))
}

#[instrument(skip(state))]
pub async fn list_mine(
    State(state): State<AppState>,
    identity: Identity,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = services::get_from_user(&state, identity, q.page.unwrap_or(1)).await?;
    Ok(Json(listings))
}
