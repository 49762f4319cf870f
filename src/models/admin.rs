use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Administrative users are not scoped to a tenant — they operate the whole OP.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminUser {
    pub id: Uuid,
    pub login_id: String,
    pub email: String,
    pub password_hash: String,
    pub status: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminSession {
    pub id: Uuid,
    pub admin_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl AdminSession {
    pub fn is_valid(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}
