//! In-memory substitutes for [`oidc_provider::store::Store`] and
//! [`oidc_provider::keys::KeyService`], implementing exactly the capability
//! traits under `oidc_provider::oidc::ports` that the grant engine depends on
//! — the narrow-interface design exists precisely so this is possible without
//! a real Postgres instance or a mock framework.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use oidc_provider::{
    error::Result,
    models::{AccessToken, AuthorizationCode, Client, IdToken, RefreshToken, Session, Tenant},
    oidc::ports::{
        AccessTokenStore, AuthorizationCodeStore, ClientFinder, IdTokenStore, RefreshTokenStore,
        SessionValidator, TenantFinder, TokenSigner,
    },
    store,
};
use rsa::RsaPrivateKey;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    pub tenants: Mutex<Vec<Tenant>>,
    pub clients: Mutex<Vec<Client>>,
    pub sessions: Mutex<Vec<Session>>,
    pub codes: Mutex<Vec<AuthorizationCode>>,
    pub access_tokens: Mutex<Vec<AccessToken>>,
    pub refresh_tokens: Mutex<Vec<RefreshToken>>,
    pub id_tokens: Mutex<Vec<IdToken>>,
}

#[async_trait]
impl TenantFinder for InMemoryStore {
    async fn find_tenant(&self, code: &str) -> Result<Option<Tenant>> {
        Ok(self.tenants.lock().unwrap().iter().find(|t| t.code == code).cloned())
    }

    async fn find_tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>> {
        Ok(self.tenants.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }
}

#[async_trait]
impl ClientFinder for InMemoryStore {
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>> {
        Ok(self.clients.lock().unwrap().iter().find(|c| c.client_id == client_id).cloned())
    }
}

#[async_trait]
impl SessionValidator for InMemoryStore {
    async fn find_session(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(self.sessions.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }
}

#[async_trait]
impl AuthorizationCodeStore for InMemoryStore {
    async fn create_code(&self, input: store::codes::NewCode<'_>) -> Result<AuthorizationCode> {
        let code = AuthorizationCode {
            id: Uuid::new_v4(),
            session_id: input.session_id,
            client_id: input.client_id,
            code: input.code.to_string(),
            redirect_uri: input.redirect_uri.to_string(),
            scope: input.scope.to_string(),
            nonce: input.nonce.map(str::to_string),
            code_challenge: input.code_challenge.map(str::to_string),
            code_challenge_method: input.code_challenge_method.map(str::to_string),
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::seconds(input.lifetime_secs as i64),
            used_at: None,
        };
        self.codes.lock().unwrap().push(code.clone());
        Ok(code)
    }

    async fn find_code(&self, code: &str) -> Result<Option<AuthorizationCode>> {
        Ok(self.codes.lock().unwrap().iter().find(|c| c.code == code).cloned())
    }

    async fn mark_code_used(&self, id: Uuid) -> Result<bool> {
        let mut codes = self.codes.lock().unwrap();
        if let Some(c) = codes.iter_mut().find(|c| c.id == id) {
            if c.used_at.is_none() {
                c.used_at = Some(Utc::now());
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl AccessTokenStore for InMemoryStore {
    async fn create_access_token(&self, input: store::access_tokens::NewAccessToken) -> Result<AccessToken> {
        let token = AccessToken {
            id: Uuid::new_v4(),
            jti: input.jti,
            session_id: input.session_id,
            client_id: input.client_id,
            scope: input.scope,
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::seconds(input.lifetime_secs as i64),
            revoked_at: None,
        };
        self.access_tokens.lock().unwrap().push(token.clone());
        Ok(token)
    }

    async fn find_access_token(&self, id: Uuid) -> Result<Option<AccessToken>> {
        Ok(self.access_tokens.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn revoke_access_token(&self, id: Uuid) -> Result<()> {
        let mut tokens = self.access_tokens.lock().unwrap();
        if let Some(t) = tokens.iter_mut().find(|t| t.id == id) {
            if t.revoked_at.is_none() {
                t.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn revoke_access_tokens_by_session(&self, session_id: Uuid) -> Result<()> {
        let mut tokens = self.access_tokens.lock().unwrap();
        for t in tokens.iter_mut().filter(|t| t.session_id == session_id && t.revoked_at.is_none()) {
            t.revoked_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create_refresh_token(&self, input: store::refresh_tokens::NewRefreshToken) -> Result<RefreshToken> {
        let token = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: input.token_hash,
            parent_id: input.parent_id,
            session_id: input.session_id,
            access_token_id: input.access_token_id,
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::seconds(input.lifetime_secs as i64),
            revoked_at: None,
            reuse_detected_at: None,
        };
        self.refresh_tokens.lock().unwrap().push(token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        Ok(self.refresh_tokens.lock().unwrap().iter().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> Result<()> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        if let Some(t) = tokens.iter_mut().find(|t| t.id == id) {
            if t.revoked_at.is_none() {
                t.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn revoke_refresh_tokens_by_session(&self, session_id: Uuid) -> Result<()> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        for t in tokens.iter_mut().filter(|t| t.session_id == session_id && t.revoked_at.is_none()) {
            t.revoked_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn mark_refresh_token_reuse_detected(&self, id: Uuid) -> Result<()> {
        let mut tokens = self.refresh_tokens.lock().unwrap();
        if let Some(t) = tokens.iter_mut().find(|t| t.id == id) {
            t.reuse_detected_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl IdTokenStore for InMemoryStore {
    async fn create_id_token(&self, input: store::id_tokens::NewIdToken<'_>) -> Result<IdToken> {
        let row = IdToken {
            id: Uuid::new_v4(),
            jti: input.jti,
            session_id: input.session_id,
            client_id: input.client_id,
            nonce: input.nonce.map(str::to_string),
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::seconds(input.lifetime_secs as i64),
        };
        self.id_tokens.lock().unwrap().push(row.clone());
        Ok(row)
    }
}

/// Stands in for [`oidc_provider::keys::KeyService`]: one fixed in-process
/// RSA-2048 key, generated once per test binary since keygen is slow.
pub struct FakeSigner {
    kid: String,
    key: RsaPrivateKey,
}

impl FakeSigner {
    pub fn new() -> Self {
        use rand::rngs::OsRng;
        let key = RsaPrivateKey::new(&mut OsRng, 2048).expect("RSA key generation");
        Self { kid: "test-key-0".to_string(), key }
    }
}

#[async_trait]
impl TokenSigner for FakeSigner {
    async fn active_signing_key(&self) -> Result<(String, RsaPrivateKey)> {
        Ok((self.kid.clone(), self.key.clone()))
    }
}
