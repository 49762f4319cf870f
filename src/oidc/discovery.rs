use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{error::OpError, store, AppState};

/// `GET /{tenant_code}/.well-known/openid-configuration` — OIDC Discovery 1.0.
pub async fn discovery(State(state): State<AppState>, Path(tenant_code): Path<String>) -> Response {
    let tenant = match store::tenants::find_by_code(&state.store.pool, &tenant_code).await {
        Ok(Some(t)) => t,
        Ok(None) => return OpError::TenantNotFound.into_response(),
        Err(e) => return OpError::Database(e.to_string()).into_response(),
    };

    let issuer = state.config.issuer_for(&tenant.code);
    let jwks_uri = format!("{}/jwks", state.config.backend_base_url);

    let body = json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{issuer}/authorize"),
        "token_endpoint": format!("{issuer}/token"),
        "userinfo_endpoint": format!("{issuer}/userinfo"),
        "jwks_uri": jwks_uri,
        "revocation_endpoint": format!("{issuer}/revoke"),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": ["RS256"],
        "scopes_supported": ["openid", "profile", "email", "offline_access"],
        "token_endpoint_auth_methods_supported": ["client_secret_basic", "client_secret_post"],
        "code_challenge_methods_supported": ["S256"],
        "claims_supported": [
            "sub", "iss", "aud", "exp", "iat", "auth_time", "nonce", "name", "email", "email_verified"
        ],
    });

    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=86400"));
    response
}
