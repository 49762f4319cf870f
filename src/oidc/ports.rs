//! Narrow capability traits the OIDC engine depends on, mirroring the
//! dependency-injection seam of the reference implementation (one interface per
//! concern rather than a single monolithic repository trait). Production code
//! wires these to the Postgres-backed `Store`/`KeyService`; tests implement
//! just the trait(s) the scenario under test exercises.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use rsa::RsaPrivateKey;
use uuid::Uuid;

use crate::{
    error::Result,
    keys::KeyService,
    models::{AccessToken, AuthorizationCode, Client, IdToken, RefreshToken, Session, Tenant},
    store::{self, Store},
};

#[async_trait]
pub trait TenantFinder {
    async fn find_tenant(&self, code: &str) -> Result<Option<Tenant>>;
    async fn find_tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>>;
}

#[async_trait]
pub trait ClientFinder {
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>>;
}

#[async_trait]
pub trait SessionValidator {
    async fn find_session(&self, id: Uuid) -> Result<Option<Session>>;
}

#[async_trait]
pub trait AuthorizationCodeStore {
    async fn create_code(&self, input: store::codes::NewCode<'_>) -> Result<AuthorizationCode>;
    async fn find_code(&self, code: &str) -> Result<Option<AuthorizationCode>>;
    async fn mark_code_used(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait AccessTokenStore {
    async fn create_access_token(&self, input: store::access_tokens::NewAccessToken) -> Result<AccessToken>;
    async fn find_access_token(&self, id: Uuid) -> Result<Option<AccessToken>>;
    async fn revoke_access_token(&self, id: Uuid) -> Result<()>;
    async fn revoke_access_tokens_by_session(&self, session_id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait RefreshTokenStore {
    async fn create_refresh_token(&self, input: store::refresh_tokens::NewRefreshToken) -> Result<RefreshToken>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>>;
    async fn revoke_refresh_token(&self, id: Uuid) -> Result<()>;
    async fn revoke_refresh_tokens_by_session(&self, session_id: Uuid) -> Result<()>;
    async fn mark_refresh_token_reuse_detected(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait IdTokenStore {
    async fn create_id_token(&self, input: store::id_tokens::NewIdToken<'_>) -> Result<IdToken>;
}

#[async_trait]
pub trait KeySetProvider {
    async fn jwk_set(&self) -> Result<JwkSet>;
}

#[async_trait]
pub trait TokenSigner {
    async fn active_signing_key(&self) -> Result<(String, RsaPrivateKey)>;
}

#[async_trait]
impl TenantFinder for Store {
    async fn find_tenant(&self, code: &str) -> Result<Option<Tenant>> {
        Ok(store::tenants::find_by_code(&self.pool, code).await?)
    }

    async fn find_tenant_by_id(&self, id: Uuid) -> Result<Option<Tenant>> {
        Ok(store::tenants::find_by_id(&self.pool, id).await?)
    }
}

#[async_trait]
impl ClientFinder for Store {
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>> {
        Ok(store::clients::find_by_client_id(&self.pool, client_id).await?)
    }
}

#[async_trait]
impl SessionValidator for Store {
    async fn find_session(&self, id: Uuid) -> Result<Option<Session>> {
        Ok(store::sessions::find_by_id(&self.pool, id).await?)
    }
}

#[async_trait]
impl AuthorizationCodeStore for Store {
    async fn create_code(&self, input: store::codes::NewCode<'_>) -> Result<AuthorizationCode> {
        Ok(store::codes::create(&self.pool, input).await?)
    }

    async fn find_code(&self, code: &str) -> Result<Option<AuthorizationCode>> {
        Ok(store::codes::find_by_code(&self.pool, code).await?)
    }

    async fn mark_code_used(&self, id: Uuid) -> Result<bool> {
        Ok(store::codes::mark_used(&self.pool, id).await?.is_some())
    }
}

#[async_trait]
impl AccessTokenStore for Store {
    async fn create_access_token(&self, input: store::access_tokens::NewAccessToken) -> Result<AccessToken> {
        Ok(store::access_tokens::create(&self.pool, input).await?)
    }

    async fn find_access_token(&self, id: Uuid) -> Result<Option<AccessToken>> {
        Ok(store::access_tokens::find_by_id(&self.pool, id).await?)
    }

    async fn revoke_access_token(&self, id: Uuid) -> Result<()> {
        store::access_tokens::revoke(&self.pool, id).await?;
        Ok(())
    }

    async fn revoke_access_tokens_by_session(&self, session_id: Uuid) -> Result<()> {
        store::access_tokens::revoke_by_session_id(&self.pool, session_id).await?;
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for Store {
    async fn create_refresh_token(&self, input: store::refresh_tokens::NewRefreshToken) -> Result<RefreshToken> {
        Ok(store::refresh_tokens::create(&self.pool, input).await?)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        Ok(store::refresh_tokens::find_by_token_hash(&self.pool, token_hash).await?)
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> Result<()> {
        store::refresh_tokens::revoke(&self.pool, id).await?;
        Ok(())
    }

    async fn revoke_refresh_tokens_by_session(&self, session_id: Uuid) -> Result<()> {
        store::refresh_tokens::revoke_by_session_id(&self.pool, session_id).await?;
        Ok(())
    }

    async fn mark_refresh_token_reuse_detected(&self, id: Uuid) -> Result<()> {
        store::refresh_tokens::mark_reuse_detected(&self.pool, id).await?;
        Ok(())
    }
}

#[async_trait]
impl IdTokenStore for Store {
    async fn create_id_token(&self, input: store::id_tokens::NewIdToken<'_>) -> Result<IdToken> {
        Ok(store::id_tokens::create(&self.pool, input).await?)
    }
}

#[async_trait]
impl KeySetProvider for KeyService {
    async fn jwk_set(&self) -> Result<JwkSet> {
        self.jwk_set().await.map_err(|e| crate::error::OpError::Internal(e.to_string()))
    }
}

#[async_trait]
impl TokenSigner for KeyService {
    async fn active_signing_key(&self) -> Result<(String, RsaPrivateKey)> {
        self.active_signing_key()
            .await
            .map_err(|e| crate::error::OpError::Internal(e.to_string()))
    }
}
