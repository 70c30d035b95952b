use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{extractors::Identity, jwt::TokenCodec};
use crate::error::AppError;

/// Gate for protected routes: verifies the bearer token and hands the
/// resolved [`Identity`] to the rest of the stack.
pub async fn require_auth(
    State(tokens): State<TokenCodec>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(req.headers(), &tokens, OffsetDateTime::now_utc())?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

pub(crate) fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenCodec,
    now: OffsetDateTime,
) -> Result<Identity, AppError> {
    let Some(raw) = headers.get(AUTHORIZATION) else {
        debug!("missing Authorization header");
        return Err(AppError::Unauthenticated);
    };

    let token = bearer_token(raw).ok_or_else(|| {
        warn!("Authorization header is not a bearer credential");
        AppError::Malformed("authorization header".into())
    })?;

    let user_id = tokens.verify(token, now).map_err(|e| {
        warn!(error = %e, "rejected bearer token");
        AppError::Unauthenticated
    })?;

    Ok(Identity { user_id })
}

/// Extracts `<token>` from `Bearer <token>`. The scheme is case-insensitive.
fn bearer_token(raw: &HeaderValue) -> Option<&str> {
    let value = raw.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
