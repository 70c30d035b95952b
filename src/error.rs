//! Request-scoped error taxonomy.
//!
//! Every variant is logged where it originates. Turning it into a response
//! only picks a status and a fixed message, so internal detail never reaches
//! the client.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::auth::{jwt::TokenError, password::PasswordError};

pub const BEARER_CHALLENGE: &str = r#"Bearer realm="access to system""#;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, invalid or expired bearer token.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("malformed input: {0}")]
    Malformed(String),

    /// Sign-in failed. Unknown email and wrong password are the same error.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found")]
    NotFound,

    #[error("deadline exceeded during {0}")]
    Timeout(&'static str),

    #[error("storage fault: {0}")]
    Storage(#[source] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Password(PasswordError::Mismatch) => StatusCode::UNAUTHORIZED,
            AppError::Malformed(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage(_) | AppError::Password(_) | AppError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "authentication required",
            AppError::Malformed(_) => "malformed request",
            AppError::InvalidCredentials | AppError::Password(PasswordError::Mismatch) => {
                "invalid credentials"
            }
            AppError::Conflict(_) => "conflict",
            AppError::NotFound => "not found",
            AppError::Timeout(_) => "service temporarily unavailable",
            AppError::Storage(_) | AppError::Password(_) | AppError::Token(_) => {
                "internal server error"
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        debug!(error = %self, %status, "request failed");

        let mut res = (
            status,
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(BEARER_CHALLENGE),
            );
        }
        res
    }
}
