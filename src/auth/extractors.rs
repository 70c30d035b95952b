use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::error;

use crate::error::AppError;

/// The authenticated caller, placed on the request by `require_auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().copied().ok_or_else(|| {
            error!(path = %parts.uri.path(), "identity extracted on a route without auth middleware");
            AppError::Unauthenticated
        })
    }
}
