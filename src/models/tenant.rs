use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A tenant is the top-level isolation boundary: its `code` appears in every
/// issuer string and every protocol path (`/{tenant_code}/authorize`, etc).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: Uuid,
    /// Immutable once created; used verbatim in the issuer string.
    pub code: String,
    pub name: String,
    pub session_lifetime_secs: i32,
    pub auth_code_lifetime_secs: i32,
    pub access_token_lifetime_secs: i32,
    pub refresh_token_lifetime_secs: i32,
    pub id_token_lifetime_secs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub const DEFAULT_SESSION_LIFETIME_SECS: i32 = 8 * 3600;
    pub const DEFAULT_AUTH_CODE_LIFETIME_SECS: i32 = 60;
    pub const DEFAULT_ACCESS_TOKEN_LIFETIME_SECS: i32 = 3600;
    pub const DEFAULT_REFRESH_TOKEN_LIFETIME_SECS: i32 = 30 * 24 * 3600;
    pub const DEFAULT_ID_TOKEN_LIFETIME_SECS: i32 = 3600;
}
