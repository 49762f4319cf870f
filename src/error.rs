use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the whole service. `IntoResponse` maps each variant to
/// the JSON error shape and status code the relevant RFC mandates; handlers that
/// need an RFC-specific redirect (authorize) or a fixed 200 (revoke) build their
/// own response and do not propagate `OpError` directly.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("tenant not found")]
    TenantNotFound,

    #[error("invalid_request: {0}")]
    InvalidRequest(String),

    #[error("unsupported_response_type")]
    UnsupportedResponseType,

    #[error("invalid_client")]
    InvalidClient,

    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    #[error("unsupported_grant_type")]
    UnsupportedGrantType,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("session not found")]
    SessionNotFound,

    #[error("session expired")]
    SessionExpired,

    #[error("invalid or expired access token")]
    InvalidToken,

    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad_request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, OpError>;

impl IntoResponse for OpError {
    fn into_response(self) -> Response {
        let (status, code, description) = match &self {
            OpError::TenantNotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            OpError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request", self.to_string()),
            OpError::UnsupportedResponseType => {
                (StatusCode::BAD_REQUEST, "unsupported_response_type", self.to_string())
            }
            OpError::InvalidClient => (StatusCode::UNAUTHORIZED, "invalid_client", self.to_string()),
            OpError::InvalidGrant(_) => (StatusCode::BAD_REQUEST, "invalid_grant", self.to_string()),
            OpError::UnsupportedGrantType => {
                (StatusCode::BAD_REQUEST, "unsupported_grant_type", self.to_string())
            }
            OpError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials", self.to_string()),
            OpError::SessionNotFound => (StatusCode::UNAUTHORIZED, "session_not_found", self.to_string()),
            OpError::SessionExpired => (StatusCode::UNAUTHORIZED, "session_expired", self.to_string()),
            OpError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", self.to_string()),
            OpError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            OpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            OpError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", self.to_string()),
            OpError::Conflict(_) => (StatusCode::CONFLICT, "conflict", self.to_string()),
            OpError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_request", self.to_string()),
            OpError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", self.to_string()),
            OpError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", self.to_string()),
        };

        let body = Json(json!({
            "error": code,
            "error_description": description,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for OpError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => OpError::NotFound,
            other => OpError::Database(other.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for OpError {
    fn from(_err: jsonwebtoken::errors::Error) -> Self {
        OpError::InvalidToken
    }
}
