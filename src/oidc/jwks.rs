use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::{error::OpError, AppState};

/// `GET /jwks` — RFC 7517 §5. Process-wide, not tenant-scoped: every tenant's
/// tokens are signed with the same key set.
pub async fn jwks(State(state): State<AppState>) -> Response {
    match state.keys.jwk_set().await {
        Ok(set) => {
            let mut response = Json(set).into_response();
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600"));
            response
        }
        Err(e) => OpError::Internal(e.to_string()).into_response(),
    }
}
