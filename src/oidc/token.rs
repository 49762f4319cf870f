use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

use crate::{
    error::{OpError, Result},
    oidc::{self, token_authcode, token_refresh},
    AppState,
};

#[derive(Debug, Deserialize, Default)]
pub struct TokenForm {
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub code_verifier: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// `POST /{tenant_code}/token` — spec §4.6. Always emits `Cache-Control:
/// no-store` / `Pragma: no-cache` per RFC 6749 §5.1, on both success and error.
pub async fn token(
    State(state): State<AppState>,
    Path(_tenant_code): Path<String>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Response {
    let result = dispatch(&state, &headers, &form).await;
    let mut response = match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => err.into_response(),
    };
    let out = response.headers_mut();
    out.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    out.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

async fn dispatch(
    state: &AppState,
    headers: &HeaderMap,
    form: &TokenForm,
) -> Result<token_authcode::TokenResponse> {
    let (client_id, client_secret) =
        oidc::extract_client_credentials(headers, form.client_id.as_deref(), form.client_secret.as_deref())
            .ok_or(OpError::InvalidClient)?;

    match form.grant_type.as_deref() {
        Some("authorization_code") => {
            let code = form
                .code
                .as_deref()
                .ok_or_else(|| OpError::InvalidRequest("code is required".into()))?;
            token_authcode::grant(
                &state.store,
                &state.keys,
                &state.config.backend_base_url,
                token_authcode::AuthCodeGrantInput {
                    client_id: &client_id,
                    client_secret: Some(&client_secret),
                    code,
                    redirect_uri: form.redirect_uri.as_deref().unwrap_or_default(),
                    code_verifier: form.code_verifier.as_deref(),
                },
            )
            .await
        }
        Some("refresh_token") => {
            let refresh_token = form
                .refresh_token
                .as_deref()
                .ok_or_else(|| OpError::InvalidRequest("refresh_token is required".into()))?;
            token_refresh::grant(
                &state.store,
                &state.keys,
                &state.config.backend_base_url,
                token_refresh::RefreshGrantInput {
                    client_id: &client_id,
                    client_secret: Some(&client_secret),
                    refresh_token,
                    scope: form.scope.as_deref(),
                },
            )
            .await
        }
        _ => Err(OpError::UnsupportedGrantType),
    }
}
