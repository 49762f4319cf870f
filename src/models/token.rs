use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AccessToken {
    pub id: Uuid,
    pub jti: Uuid,
    pub session_id: Uuid,
    pub client_id: Uuid,
    pub scope: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn is_valid(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token_hash: String,
    pub parent_id: Option<Uuid>,
    pub session_id: Uuid,
    pub access_token_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub reuse_detected_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct IdToken {
    pub id: Uuid,
    pub jti: Uuid,
    pub session_id: Uuid,
    pub client_id: Uuid,
    pub nonce: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
