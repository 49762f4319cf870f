use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SignKey {
    pub id: Uuid,
    pub kid: String,
    pub algorithm: String,
    /// PKIX PEM, clear text.
    pub public_key: String,
    /// PKCS#1 PEM, AES-256-GCM sealed under the process KEK.
    pub private_key_sealed: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub rotated_at: Option<DateTime<Utc>>,
}
