use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{error::{OpError, Result}, AppState};

const SESSION_COOKIE: &str = "op_session";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub tenant_code: String,
    pub login_id: String,
    pub password: String,
}

#[derive(Serialize)]
struct UserSummary {
    id: Uuid,
    name: Option<String>,
    email: String,
}

/// `POST /internal/login` — authenticates and opens a session cookie.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let output = crate::auth::login(
        &state.store.pool,
        crate::auth::LoginInput {
            tenant_code: &req.tenant_code,
            login_id: &req.login_id,
            password: &req.password,
            ip_address,
            user_agent,
        },
    )
    .await?;

    let mut response = Json(json!({
        "session_id": output.session.id,
        "user": UserSummary {
            id: output.user.id,
            name: output.user.name,
            email: output.user.email,
        },
    }))
    .into_response();

    let cookie = build_session_cookie(SESSION_COOKIE, &output.session.id.to_string(), state.config.is_secure());
    response
        .headers_mut()
        .insert(header::SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());

    Ok(response)
}

/// `GET /internal/me` — resolves the current session from the `op_session` cookie.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse> {
    let session_id = read_cookie(&headers, SESSION_COOKIE)
        .and_then(|v| Uuid::parse_str(&v).ok())
        .ok_or(OpError::SessionNotFound)?;

    let session = crate::auth::validate_session(&state.store.pool, session_id).await?;
    let user = crate::store::users::find_by_id(&state.store.pool, session.user_id)
        .await?
        .ok_or(OpError::SessionNotFound)?;

    Ok(Json(json!({
        "session_id": session.id,
        "tenant_id": session.tenant_id,
        "user": UserSummary { id: user.id, name: user.name, email: user.email },
    })))
}

pub(crate) fn build_session_cookie(name: &str, value: &str, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax{secure_attr}")
}

pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let pair = pair.trim();
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}
