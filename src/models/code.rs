use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthorizationCode {
    pub id: Uuid,
    pub session_id: Uuid,
    pub client_id: Uuid,
    pub code: String,
    pub redirect_uri: String,
    pub scope: String,
    pub nonce: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl AuthorizationCode {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
