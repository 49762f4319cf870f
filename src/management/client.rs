use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    crypto,
    error::{OpError, Result},
    models::Client,
    store, AppState,
};

#[derive(Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub client_id: String,
    pub name: String,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub token_endpoint_auth_method: String,
    pub require_pkce: bool,
    pub status: String,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            client_id: c.client_id,
            name: c.name,
            grant_types: c.grant_types.0,
            response_types: c.response_types.0,
            token_endpoint_auth_method: c.token_endpoint_auth_method,
            require_pkce: c.require_pkce,
            status: c.status,
        }
    }
}

/// The plaintext client secret is only ever returned at creation or rotation
/// time; from then on the store holds only its argon2id hash.
#[derive(Serialize)]
pub struct ClientCreatedResponse {
    #[serde(flatten)]
    pub client: ClientResponse,
    pub client_secret: String,
}

#[derive(Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default = "default_grant_types")]
    pub grant_types: Vec<String>,
    #[serde(default = "default_require_pkce")]
    pub require_pkce: bool,
}

fn default_grant_types() -> Vec<String> {
    vec!["authorization_code".to_string(), "refresh_token".to_string()]
}

fn default_require_pkce() -> bool {
    true
}

/// `GET /management/v1/tenants/:tenant_id/clients`.
pub async fn list(State(state): State<AppState>, Path(tenant_id): Path<Uuid>) -> Result<Json<Vec<ClientResponse>>> {
    let clients = store::clients::list_for_tenant(&state.store.pool, tenant_id).await?;
    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

/// `POST /management/v1/tenants/:tenant_id/clients` — generates the external
/// `client_id` and a random secret, returning the secret once.
pub async fn create(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(req): Json<CreateClientRequest>,
) -> Result<Json<ClientCreatedResponse>> {
    if store::tenants::find_by_id(&state.store.pool, tenant_id).await?.is_none() {
        return Err(OpError::NotFound);
    }

    let client_id = generate_hex(16);
    let client_secret = generate_hex(32);
    let secret_hash = crypto::password::hash(&client_secret).map_err(|e| OpError::Internal(e.to_string()))?;

    let client = store::clients::create(
        &state.store.pool,
        store::clients::NewClient {
            tenant_id,
            client_id: &client_id,
            client_secret_hash: &secret_hash,
            name: &req.name,
            grant_types: req.grant_types,
            response_types: vec!["code".to_string()],
            require_pkce: req.require_pkce,
        },
    )
    .await?;

    Ok(Json(ClientCreatedResponse { client: client.into(), client_secret }))
}

/// `GET /management/v1/clients/:id`.
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ClientResponse>> {
    let client = store::clients::find_by_id(&state.store.pool, id).await?.ok_or(OpError::NotFound)?;
    Ok(Json(client.into()))
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// `PATCH /management/v1/clients/:id/status` — the only mutation the client
/// soft-delete state machine allows (`status` ∈ {active, disabled}, spec §3).
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ClientResponse>> {
    if req.status != "active" && req.status != "disabled" {
        return Err(OpError::BadRequest("status must be 'active' or 'disabled'".into()));
    }
    let client = store::clients::set_status(&state.store.pool, id, &req.status)
        .await?
        .ok_or(OpError::NotFound)?;
    Ok(Json(client.into()))
}

/// `POST /management/v1/clients/:id/rotate-secret` — grounded in
/// `original_source/internal/management/secret.go`: generates and returns a
/// fresh secret once, persisting only its hash.
pub async fn rotate_secret(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<serde_json::Value>> {
    let client_secret = generate_hex(32);
    let secret_hash = crypto::password::hash(&client_secret).map_err(|e| OpError::Internal(e.to_string()))?;
    store::clients::set_secret_hash(&state.store.pool, id, &secret_hash)
        .await?
        .ok_or(OpError::NotFound)?;
    Ok(Json(serde_json::json!({ "client_secret": client_secret })))
}

#[derive(Deserialize)]
pub struct AddRedirectUriRequest {
    pub uri: String,
}

/// `POST /management/v1/clients/:id/redirect-uris` — requires an absolute,
/// fragment-free URL with a scheme and host (spec §3).
pub async fn add_redirect_uri(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddRedirectUriRequest>,
) -> Result<Json<serde_json::Value>> {
    if !is_valid_redirect_uri(&req.uri) {
        return Err(OpError::BadRequest("uri must be absolute, schemed, and fragment-free".into()));
    }
    let created = store::clients::add_redirect_uri(&state.store.pool, id, &req.uri).await?;
    Ok(Json(serde_json::json!({ "id": created.id, "uri": created.uri })))
}

/// `DELETE /management/v1/clients/:id/redirect-uris/:redirect_uri_id`.
pub async fn remove_redirect_uri(
    State(state): State<AppState>,
    Path((id, redirect_uri_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let removed = store::clients::remove_redirect_uri(&state.store.pool, id, redirect_uri_id).await?;
    if removed == 0 {
        return Err(OpError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

fn generate_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

fn is_valid_redirect_uri(uri: &str) -> bool {
    if uri.contains('#') {
        return false;
    }
    let Some(idx) = uri.find("://") else { return false };
    let scheme = &uri[..idx];
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return false;
    }
    let rest = &uri[idx + 3..];
    let host = rest.split(['/', '?']).next().unwrap_or("");
    !host.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_https_uri() {
        assert!(is_valid_redirect_uri("https://rp.example/callback"));
    }

    #[test]
    fn rejects_fragment_and_relative() {
        assert!(!is_valid_redirect_uri("https://rp.example/callback#frag"));
        assert!(!is_valid_redirect_uri("/callback"));
        assert!(!is_valid_redirect_uri("https:///callback"));
    }
}
