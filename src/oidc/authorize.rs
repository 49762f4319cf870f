use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{auth::handlers::read_cookie, token, AppState};

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub response_type: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub prompt: Option<String>,
}

/// `GET /{tenant_code}/authorize` — spec §4.6, the full decision pipeline.
///
/// Ordering matters: the first three checks below have nowhere safe to redirect
/// to yet (no verified `redirect_uri`), so they answer with a direct JSON 400/404.
/// Every check after the redirect_uri match instead redirects back to the client
/// carrying `error`/`error_description`/`state`.
pub async fn authorize(
    State(state): State<AppState>,
    Path(tenant_code): Path<String>,
    Query(params): Query<AuthorizeParams>,
    headers: HeaderMap,
) -> Response {
    match authorize_inner(&state, &tenant_code, &params, &headers).await {
        Ok(response) => response,
        Err(AuthorizeOutcome::Direct(status, body)) => (status, Json(body)).into_response(),
        Err(AuthorizeOutcome::Redirect(uri)) => found_redirect(&uri),
    }
}

enum AuthorizeOutcome {
    Direct(axum::http::StatusCode, serde_json::Value),
    Redirect(String),
}

/// 302 Found with a `Location` header — spec §4.6 steps 10-11 and E2E
/// scenario 1 both specify 302, not axum's `Redirect::to` default of 303.
fn found_redirect(location: &str) -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, HeaderValue::from_str(location).unwrap_or_else(|_| HeaderValue::from_static("/")))
        .body(Body::empty())
        .unwrap()
        .into_response()
}

async fn authorize_inner(
    state: &AppState,
    tenant_code: &str,
    params: &AuthorizeParams,
    headers: &HeaderMap,
) -> Result<Response, AuthorizeOutcome> {
    let tenant = crate::store::tenants::find_by_code(&state.store.pool, tenant_code)
        .await
        .map_err(|e| direct_error(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "server_error", &e.to_string()))?
        .ok_or_else(|| direct_error(axum::http::StatusCode::NOT_FOUND, "not_found", "unknown tenant"))?;

    if params.response_type.as_deref() != Some("code") {
        return Err(direct_error(
            axum::http::StatusCode::BAD_REQUEST,
            "unsupported_response_type",
            "only the authorization code flow is supported",
        ));
    }

    let client_id = params
        .client_id
        .as_deref()
        .ok_or_else(|| direct_error(axum::http::StatusCode::BAD_REQUEST, "invalid_request", "client_id is required"))?;

    let client = crate::store::clients::find_by_client_id(&state.store.pool, client_id)
        .await
        .map_err(|e| direct_error(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "server_error", &e.to_string()))?
        .ok_or_else(|| direct_error(axum::http::StatusCode::BAD_REQUEST, "invalid_request", "unknown client_id"))?;

    if !client.is_active() || client.tenant_id != tenant.id {
        return Err(direct_error(
            axum::http::StatusCode::BAD_REQUEST,
            "invalid_request",
            "client is not active for this tenant",
        ));
    }

    let redirect_uri = params
        .redirect_uri
        .as_deref()
        .ok_or_else(|| direct_error(axum::http::StatusCode::BAD_REQUEST, "invalid_request", "redirect_uri is required"))?;

    let registered = crate::store::clients::redirect_uris(&state.store.pool, client.id)
        .await
        .map_err(|e| direct_error(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "server_error", &e.to_string()))?;
    if !registered.iter().any(|r| r.uri == redirect_uri) {
        return Err(direct_error(
            axum::http::StatusCode::BAD_REQUEST,
            "invalid_request",
            "redirect_uri is not registered for this client",
        ));
    }

    // From here on, errors are reported back to the client via redirect.
    let scope = params.scope.clone().unwrap_or_default();
    if !scope.split_whitespace().any(|s| s == "openid") {
        return Err(error_redirect(redirect_uri, "invalid_scope", "openid scope is required", params.state.as_deref()));
    }

    if !client.has_grant_type("authorization_code") {
        return Err(error_redirect(
            redirect_uri,
            "unauthorized_client",
            "client is not authorized for the authorization_code grant",
            params.state.as_deref(),
        ));
    }

    if client.require_pkce {
        let challenge = params.code_challenge.as_deref();
        let method = params.code_challenge_method.as_deref();
        if challenge.is_none() || method != Some("S256") {
            return Err(error_redirect(
                redirect_uri,
                "invalid_request",
                "PKCE with S256 is required by this client",
                params.state.as_deref(),
            ));
        }
    }

    let session_id = read_cookie(headers, "op_session").and_then(|v| Uuid::parse_str(&v).ok());
    let session = match session_id {
        Some(id) => crate::store::sessions::find_by_id(&state.store.pool, id)
            .await
            .map_err(|e| direct_error(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "server_error", &e.to_string()))?
            .filter(|s| s.is_valid() && s.tenant_id == tenant.id),
        None => None,
    };

    let prompt = params.prompt.as_deref();
    if prompt == Some("none") && session.is_none() {
        return Err(error_redirect(redirect_uri, "login_required", "no active session", params.state.as_deref()));
    }

    let session = if prompt == Some("login") { None } else { session };

    let Some(session) = session else {
        return Ok(found_redirect(&login_redirect_url(state, tenant_code, &original_request_url(tenant_code, params))));
    };

    let code = token::generate_authorization_code();
    let created = crate::store::codes::create(
        &state.store.pool,
        crate::store::codes::NewCode {
            session_id: session.id,
            client_id: client.id,
            code: &code,
            redirect_uri,
            scope: &scope,
            nonce: params.nonce.as_deref(),
            code_challenge: params.code_challenge.as_deref(),
            code_challenge_method: params.code_challenge_method.as_deref(),
            lifetime_secs: tenant.auth_code_lifetime_secs,
        },
    )
    .await
    .map_err(|e| direct_error(axum::http::StatusCode::INTERNAL_SERVER_ERROR, "server_error", &e.to_string()))?;

    let mut redirect_to = format!("{redirect_uri}{}code={}", separator(redirect_uri), created.code);
    if let Some(state_param) = &params.state {
        redirect_to.push_str(&format!("&state={state_param}"));
    }

    Ok(found_redirect(&redirect_to))
}

fn separator(redirect_uri: &str) -> &'static str {
    if redirect_uri.contains('?') {
        "&"
    } else {
        "?"
    }
}

fn direct_error(status: axum::http::StatusCode, code: &str, description: &str) -> AuthorizeOutcome {
    AuthorizeOutcome::Direct(status, json!({"error": code, "error_description": description}))
}

fn error_redirect(redirect_uri: &str, code: &str, description: &str, state: Option<&str>) -> AuthorizeOutcome {
    let mut url = format!(
        "{redirect_uri}{}error={code}&error_description={}",
        separator(redirect_uri),
        urlencode(description)
    );
    if let Some(state) = state {
        url.push_str(&format!("&state={}", urlencode(state)));
    }
    AuthorizeOutcome::Redirect(url)
}

fn login_redirect_url(state: &AppState, tenant_code: &str, redirect_after_login: &str) -> String {
    format!(
        "{}/login?tenant_code={}&redirect_after_login={}",
        state.config.frontend_base_url.trim_end_matches('/'),
        tenant_code,
        urlencode(redirect_after_login)
    )
}

fn original_request_url(tenant_code: &str, params: &AuthorizeParams) -> String {
    let mut qs = vec![format!("response_type={}", params.response_type.clone().unwrap_or_default())];
    if let Some(v) = &params.client_id {
        qs.push(format!("client_id={v}"));
    }
    if let Some(v) = &params.redirect_uri {
        qs.push(format!("redirect_uri={}", urlencode(v)));
    }
    if let Some(v) = &params.scope {
        qs.push(format!("scope={}", urlencode(v)));
    }
    if let Some(v) = &params.state {
        qs.push(format!("state={}", urlencode(v)));
    }
    if let Some(v) = &params.nonce {
        qs.push(format!("nonce={}", urlencode(v)));
    }
    if let Some(v) = &params.code_challenge {
        qs.push(format!("code_challenge={v}"));
    }
    if let Some(v) = &params.code_challenge_method {
        qs.push(format!("code_challenge_method={v}"));
    }
    format!("/{tenant_code}/authorize?{}", qs.join("&"))
}

fn urlencode(raw: &str) -> String {
    // Minimal percent-encoding sufficient for query-string values we generate
    // ourselves (no external crate pulled in purely for this).
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
