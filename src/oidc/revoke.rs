use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use jsonwebtoken::jwk::JwkSet;
use serde::Deserialize;

use crate::{crypto, error::OpError, oidc, store, token, AppState};

#[derive(Debug, Deserialize, Default)]
pub struct RevokeForm {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token: Option<String>,
    pub token_type_hint: Option<String>,
}

/// `POST /{tenant_code}/revoke` — RFC 7009. Always answers 200, even for a
/// missing, foreign, or already-revoked token: the endpoint never reveals
/// whether a token existed.
pub async fn revoke(
    State(state): State<AppState>,
    Path(_tenant_code): Path<String>,
    headers: HeaderMap,
    Form(form): Form<RevokeForm>,
) -> Response {
    let Some((client_id, client_secret)) =
        oidc::extract_client_credentials(&headers, form.client_id.as_deref(), form.client_secret.as_deref())
    else {
        return OpError::InvalidClient.into_response();
    };

    let client = match store::clients::find_by_client_id(&state.store.pool, &client_id).await {
        Ok(Some(c)) => c,
        Ok(None) => return OpError::InvalidClient.into_response(),
        Err(e) => return OpError::Database(e.to_string()).into_response(),
    };

    match crypto::password::verify(&client_secret, &client.client_secret_hash) {
        Ok(true) if client.is_active() => {}
        _ => return OpError::InvalidClient.into_response(),
    }

    let Some(token_str) = form.token.as_deref() else {
        return StatusCode::OK.into_response();
    };

    let jwks = state.keys.jwk_set().await.ok();

    let _ = match form.token_type_hint.as_deref() {
        Some("refresh_token") => {
            try_revoke_refresh_token(&state, token_str).await || try_revoke_access_token(&state, token_str, jwks.as_ref()).await
        }
        _ => {
            try_revoke_access_token(&state, token_str, jwks.as_ref()).await || try_revoke_refresh_token(&state, token_str).await
        }
    };

    StatusCode::OK.into_response()
}

async fn try_revoke_access_token(state: &AppState, token_str: &str, jwks: Option<&JwkSet>) -> bool {
    let Some(jwks) = jwks else { return false };
    let Ok(claims) = token::verify_access_token(token_str, jwks) else {
        return false;
    };
    let Ok(Some(row)) = store::access_tokens::find_by_jti(&state.store.pool, claims.jti).await else {
        return false;
    };
    store::access_tokens::revoke(&state.store.pool, row.id).await.is_ok()
}

async fn try_revoke_refresh_token(state: &AppState, token_str: &str) -> bool {
    let hash = crypto::hash::sha256_hex(token_str.as_bytes());
    let Ok(Some(row)) = store::refresh_tokens::find_by_token_hash(&state.store.pool, &hash).await else {
        return false;
    };
    let revoked = store::refresh_tokens::revoke(&state.store.pool, row.id).await.is_ok();
    let _ = store::access_tokens::revoke(&state.store.pool, row.access_token_id).await;
    revoked
}
