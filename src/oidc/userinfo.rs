use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{error::OpError, store, token, AppState};

/// `GET /{tenant_code}/userinfo` — OIDC Core 1.0 §5.3. Claims are gated on the
/// access token's scope: `sub` is always present, `profile` adds `name` and
/// `updated_at`, `email` adds `email` and `email_verified`.
pub async fn userinfo(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(bearer) = bearer_token(&headers) else {
        return unauthorized_response(None);
    };

    let jwks = match state.keys.jwk_set().await {
        Ok(set) => set,
        Err(e) => return OpError::Internal(e.to_string()).into_response(),
    };

    let claims = match token::verify_access_token(bearer, &jwks) {
        Ok(c) => c,
        Err(_) => return unauthorized_response(Some("invalid_token")),
    };

    let db_token = match store::access_tokens::find_by_jti(&state.store.pool, claims.jti).await {
        Ok(Some(t)) if t.is_valid() => t,
        Ok(_) => return unauthorized_response(Some("invalid_token")),
        Err(e) => return OpError::Database(e.to_string()).into_response(),
    };
    let _ = db_token;

    let Ok(user_id) = claims.sub.parse::<Uuid>() else {
        return unauthorized_response(Some("invalid_token"));
    };

    let user = match store::users::find_by_id(&state.store.pool, user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => return OpError::Internal("user for access token vanished".into()).into_response(),
        Err(e) => return OpError::Database(e.to_string()).into_response(),
    };

    let mut body = json!({ "sub": user.id });
    let scopes: Vec<&str> = claims.scope.split_whitespace().collect();
    if scopes.contains(&"profile") {
        if let Some(name) = &user.name {
            body["name"] = json!(name);
        }
        body["updated_at"] = json!(user.updated_at.timestamp());
    }
    if scopes.contains(&"email") {
        body["email"] = json!(user.email);
        body["email_verified"] = json!(user.email_verified);
    }

    Json(body).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

fn unauthorized_response(error: Option<&str>) -> Response {
    let www_authenticate = match error {
        Some(code) => format!(r#"Bearer error="{code}""#),
        None => "Bearer".to_string(),
    };
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error.unwrap_or("invalid_token") })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_str(&www_authenticate).unwrap());
    response
}
