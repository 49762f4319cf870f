use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{OpError, Result},
    models::Tenant,
    store, AppState,
};

#[derive(Serialize)]
pub struct TenantResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub session_lifetime_secs: i32,
    pub auth_code_lifetime_secs: i32,
    pub access_token_lifetime_secs: i32,
    pub refresh_token_lifetime_secs: i32,
    pub id_token_lifetime_secs: i32,
}

impl From<Tenant> for TenantResponse {
    fn from(t: Tenant) -> Self {
        Self {
            id: t.id,
            code: t.code,
            name: t.name,
            session_lifetime_secs: t.session_lifetime_secs,
            auth_code_lifetime_secs: t.auth_code_lifetime_secs,
            access_token_lifetime_secs: t.access_token_lifetime_secs,
            refresh_token_lifetime_secs: t.refresh_token_lifetime_secs,
            id_token_lifetime_secs: t.id_token_lifetime_secs,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateTenantRequest {
    pub code: String,
    pub name: String,
}

/// `GET /management/v1/tenants`.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<TenantResponse>>> {
    let tenants = store::tenants::list(&state.store.pool).await?;
    Ok(Json(tenants.into_iter().map(TenantResponse::from).collect()))
}

/// `POST /management/v1/tenants` — `code` is validated against
/// `^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$` and then immutable (spec §3); lifetimes
/// start at [`Tenant`]'s defaults.
pub async fn create(State(state): State<AppState>, Json(req): Json<CreateTenantRequest>) -> Result<Json<TenantResponse>> {
    if !is_valid_tenant_code(&req.code) {
        return Err(OpError::BadRequest(
            "code must match ^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$".into(),
        ));
    }
    if req.name.trim().is_empty() {
        return Err(OpError::BadRequest("name is required".into()));
    }
    if store::tenants::find_by_code(&state.store.pool, &req.code).await?.is_some() {
        return Err(OpError::Conflict("tenant code already in use".into()));
    }

    let tenant = store::tenants::create(&state.store.pool, store::tenants::NewTenant { code: &req.code, name: &req.name })
        .await?;
    Ok(Json(tenant.into()))
}

/// `GET /management/v1/tenants/:id`.
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<TenantResponse>> {
    let tenant = store::tenants::find_by_id(&state.store.pool, id).await?.ok_or(OpError::NotFound)?;
    Ok(Json(tenant.into()))
}

#[derive(Deserialize)]
pub struct UpdateTenantRequest {
    pub name: String,
}

/// `PATCH /management/v1/tenants/:id` — only `name` is mutable; `code` is
/// immutable once created (spec §3).
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTenantRequest>,
) -> Result<Json<TenantResponse>> {
    let tenant = store::tenants::update_name(&state.store.pool, id, &req.name)
        .await?
        .ok_or(OpError::NotFound)?;
    Ok(Json(tenant.into()))
}

/// No `regex` dependency in this crate (protocol-shaped, not a registration
/// form); the pattern `^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$` is small enough to
/// check by hand.
fn is_valid_tenant_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() < 3 || bytes.len() > 63 {
        return false;
    }
    let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !is_alnum(bytes[0]) || !is_alnum(bytes[bytes.len() - 1]) {
        return false;
    }
    bytes[1..bytes.len() - 1].iter().all(|&b| is_alnum(b) || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_codes() {
        assert!(is_valid_tenant_code("acme"));
        assert!(is_valid_tenant_code("a-b-c"));
    }

    #[test]
    fn rejects_invalid_codes() {
        assert!(!is_valid_tenant_code("a"));
        assert!(!is_valid_tenant_code("-abc"));
        assert!(!is_valid_tenant_code("abc-"));
        assert!(!is_valid_tenant_code("ABC"));
    }
}
