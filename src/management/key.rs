use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::{OpError, Result},
    keys::KeyError,
    models::SignKey,
    AppState,
};

#[derive(Serialize)]
pub struct KeyResponse {
    pub kid: String,
    pub algorithm: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub rotated_at: Option<DateTime<Utc>>,
}

impl From<SignKey> for KeyResponse {
    fn from(k: SignKey) -> Self {
        Self { kid: k.kid, algorithm: k.algorithm, active: k.active, created_at: k.created_at, rotated_at: k.rotated_at }
    }
}

/// `GET /management/v1/keys`.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<KeyResponse>>> {
    let keys = state.keys.list_all().await.map_err(map_key_error)?;
    Ok(Json(keys.into_iter().map(KeyResponse::from).collect()))
}

/// `POST /management/v1/keys/rotate` — deactivates every currently active key
/// and generates a fresh one; invariant K1 (at least one active key at all
/// times) is preserved by [`crate::keys::KeyService::rotate`] itself.
pub async fn rotate(State(state): State<AppState>) -> Result<Json<KeyResponse>> {
    let key = state.keys.rotate().await.map_err(map_key_error)?;
    Ok(Json(key.into()))
}

/// `DELETE /management/v1/keys/:kid` — refuses to drop the active-key count
/// to zero (invariant K1).
pub async fn deactivate(State(state): State<AppState>, Path(kid): Path<String>) -> Result<StatusCode> {
    state.keys.deactivate(&kid).await.map_err(map_key_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn map_key_error(err: KeyError) -> OpError {
    match err {
        KeyError::NotFound => OpError::NotFound,
        KeyError::AlreadyInactive => OpError::BadRequest("key is already inactive".into()),
        KeyError::LastActiveKey => OpError::BadRequest("cannot deactivate the last active signing key".into()),
        other => OpError::Internal(other.to_string()),
    }
}
