use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Public identifier presented in `client_id` form fields / Basic auth.
    pub client_id: String,
    pub client_secret_hash: String,
    pub name: String,
    pub grant_types: Json<Vec<String>>,
    pub response_types: Json<Vec<String>>,
    pub token_endpoint_auth_method: String,
    pub require_pkce: bool,
    pub frontchannel_logout_uri: Option<String>,
    pub backchannel_logout_uri: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    pub fn has_grant_type(&self, grant_type: &str) -> bool {
        self.grant_types.0.iter().any(|g| g == grant_type)
    }

    pub fn has_response_type(&self, response_type: &str) -> bool {
        self.response_types.0.iter().any(|r| r == response_type)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RedirectUri {
    pub id: Uuid,
    pub client_id: Uuid,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostLogoutRedirectUri {
    pub id: Uuid,
    pub client_id: Uuid,
    pub uri: String,
}
