use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::Result, store, AppState};

#[derive(Serialize)]
pub struct RevokedCounts {
    pub sessions: u64,
    pub access_tokens: u64,
    pub refresh_tokens: u64,
}

/// `POST /management/v1/incidents/revoke-all-tokens` — terminates every
/// session and token in the system. Sequenced session, then access token,
/// then refresh token, matching the original incident-response ordering.
pub async fn revoke_all(State(state): State<AppState>) -> Result<Json<RevokedCounts>> {
    let pool = &state.store.pool;
    let sessions = store::sessions::revoke_all(pool).await?;
    let access_tokens = store::access_tokens::revoke_all(pool).await?;
    let refresh_tokens = store::refresh_tokens::revoke_all(pool).await?;
    Ok(Json(RevokedCounts { sessions, access_tokens, refresh_tokens }))
}

#[derive(Deserialize)]
pub struct RevokeTenantRequest {
    pub tenant_id: Uuid,
}

/// `POST /management/v1/incidents/revoke-tenant-tokens`.
pub async fn revoke_tenant(State(state): State<AppState>, Json(req): Json<RevokeTenantRequest>) -> Result<Json<RevokedCounts>> {
    let pool = &state.store.pool;
    let sessions = store::sessions::revoke_by_tenant_id(pool, req.tenant_id).await?;
    let access_tokens = store::access_tokens::revoke_by_tenant_id(pool, req.tenant_id).await?;
    let refresh_tokens = store::refresh_tokens::revoke_by_tenant_id(pool, req.tenant_id).await?;
    Ok(Json(RevokedCounts { sessions, access_tokens, refresh_tokens }))
}

#[derive(Deserialize)]
pub struct RevokeUserRequest {
    pub user_id: Uuid,
}

/// `POST /management/v1/incidents/revoke-user-tokens`.
pub async fn revoke_user(State(state): State<AppState>, Json(req): Json<RevokeUserRequest>) -> Result<Json<RevokedCounts>> {
    let pool = &state.store.pool;
    let sessions = store::sessions::revoke_by_user_id(pool, req.user_id).await?;
    let access_tokens = store::access_tokens::revoke_by_user_id(pool, req.user_id).await?;
    let refresh_tokens = store::refresh_tokens::revoke_by_user_id(pool, req.user_id).await?;
    Ok(Json(RevokedCounts { sessions, access_tokens, refresh_tokens }))
}
