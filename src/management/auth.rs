use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    crypto,
    error::{OpError, Result},
    models::AdminUser,
    store, AppState,
};

const ADMIN_SESSION_COOKIE: &str = "op_admin_session";
const ADMIN_SESSION_LIFETIME_SECS: i64 = 8 * 3600;

/// Resolved by [`require_admin_session`] and inserted into request
/// extensions; handlers that need the caller's identity pull it from there.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub id: Uuid,
    pub login_id: String,
}

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub login_id: String,
    pub password: String,
}

#[derive(Serialize)]
struct AdminUserSummary {
    id: Uuid,
    login_id: String,
    email: String,
}

impl From<&AdminUser> for AdminUserSummary {
    fn from(u: &AdminUser) -> Self {
        Self { id: u.id, login_id: u.login_id.clone(), email: u.email.clone() }
    }
}

/// `POST /management/v1/auth/login` — independent of the end-user login flow:
/// a distinct table, cookie, and middleware, never crossing into the
/// tenant-scoped session machinery (spec §4.7).
pub async fn login(State(state): State<AppState>, Json(req): Json<AdminLoginRequest>) -> Result<impl IntoResponse> {
    if req.login_id.is_empty() || req.password.is_empty() {
        return Err(OpError::BadRequest("login_id and password are required".into()));
    }

    let user = store::admin::find_user_by_login_id(&state.store.pool, &req.login_id)
        .await?
        .ok_or(OpError::InvalidCredentials)?;

    if !user.is_active() {
        return Err(OpError::InvalidCredentials);
    }

    let ok = crypto::password::verify(&req.password, &user.password_hash)
        .map_err(|e| OpError::Internal(e.to_string()))?;
    if !ok {
        return Err(OpError::InvalidCredentials);
    }

    let session = store::admin::create_session(&state.store.pool, user.id, ADMIN_SESSION_LIFETIME_SECS).await?;

    let mut response = Json(json!({ "user": AdminUserSummary::from(&user) })).into_response();
    let cookie = crate::auth::handlers::build_session_cookie(
        ADMIN_SESSION_COOKIE,
        &session.id.to_string(),
        state.config.is_secure(),
    );
    response.headers_mut().insert(header::SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());
    Ok(response)
}

/// `GET /management/v1/auth/me`.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse> {
    let admin = authenticate(&state, &headers).await?;
    let user = store::admin::find_user_by_id(&state.store.pool, admin.id)
        .await?
        .ok_or(OpError::Unauthorized)?;
    Ok(Json(json!({ "user": AdminUserSummary::from(&user) })))
}

/// Resolves the `op_admin_session` cookie into the authenticated admin, or
/// `OpError::Unauthorized`. Shared by [`me`] and [`require_admin_session`].
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CurrentAdmin> {
    let session_id = crate::auth::handlers::read_cookie(headers, ADMIN_SESSION_COOKIE)
        .and_then(|v| Uuid::parse_str(&v).ok())
        .ok_or(OpError::Unauthorized)?;

    let session = store::admin::find_session(&state.store.pool, session_id)
        .await?
        .ok_or(OpError::Unauthorized)?;
    if !session.is_valid() {
        return Err(OpError::Unauthorized);
    }

    let user = store::admin::find_user_by_id(&state.store.pool, session.admin_user_id)
        .await?
        .ok_or(OpError::Unauthorized)?;
    if !user.is_active() {
        return Err(OpError::Unauthorized);
    }

    Ok(CurrentAdmin { id: user.id, login_id: user.login_id })
}

/// `axum::middleware::from_fn_with_state` guard applied to every
/// `/management/v1/*` route except `auth/login`.
pub async fn require_admin_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, &headers).await {
        Ok(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(_) => OpError::Unauthorized.into_response(),
    }
}
