use chrono::Utc;
use uuid::Uuid;

use crate::{
    crypto,
    error::{OpError, Result},
    oidc::ports::{AccessTokenStore, ClientFinder, RefreshTokenStore, SessionValidator, TenantFinder, TokenSigner},
    oidc::token_authcode::TokenResponse,
    store,
    token::{self, AccessTokenClaims},
};

pub struct RefreshGrantInput<'a> {
    pub client_id: &'a str,
    pub client_secret: Option<&'a str>,
    pub refresh_token: &'a str,
    pub scope: Option<&'a str>,
}

/// spec §4.6 "Token" / `refresh_token` grant, implementing RFC 9700 rotation
/// with reuse detection: presenting an already-rotated (`revoked_at.is_some()`)
/// refresh token revokes every access and refresh token in its session, since a
/// replayed refresh token means the token was stolen and both the legitimate and
/// the attacking party are now indistinguishable.
pub async fn grant<S, K>(store: &S, keys: &K, issuer_base: &str, input: RefreshGrantInput<'_>) -> Result<TokenResponse>
where
    S: ClientFinder + AccessTokenStore + RefreshTokenStore + SessionValidator + TenantFinder,
    K: TokenSigner,
{
    let client = store
        .find_client(input.client_id)
        .await?
        .ok_or(OpError::InvalidClient)?;
    verify_client_secret(&client, input.client_secret)?;

    if !client.has_grant_type("refresh_token") {
        return Err(OpError::UnsupportedGrantType);
    }

    let token_hash = crypto::hash::sha256_hex(input.refresh_token.as_bytes());
    let rt = store
        .find_refresh_token(&token_hash)
        .await?
        .ok_or_else(|| OpError::InvalidGrant("unknown refresh token".into()))?;

    if rt.revoked_at.is_some() {
        store.mark_refresh_token_reuse_detected(rt.id).await?;
        store.revoke_access_tokens_by_session(rt.session_id).await?;
        store.revoke_refresh_tokens_by_session(rt.session_id).await?;
        return Err(OpError::InvalidGrant("refresh token reuse detected".into()));
    }

    if rt.is_expired() {
        return Err(OpError::InvalidGrant("refresh token expired".into()));
    }

    let session = store
        .find_session(rt.session_id)
        .await?
        .ok_or_else(|| OpError::InvalidGrant("session no longer exists".into()))?;
    if !session.is_valid() {
        return Err(OpError::InvalidGrant("session is no longer valid".into()));
    }

    let prior_access_token = store.find_access_token(rt.access_token_id).await?;

    // Rotate: the presented refresh token and its paired access token are both
    // retired before new ones are minted.
    store.revoke_refresh_token(rt.id).await?;
    store.revoke_access_token(rt.access_token_id).await?;

    let tenant = store
        .find_tenant_by_id(session.tenant_id)
        .await?
        .ok_or_else(|| OpError::Internal("tenant for session vanished".into()))?;

    // Scope is adopted verbatim from the request if supplied, else carried over
    // from the grant being rotated; no subset-of-original enforcement
    // (documented gap, DESIGN.md).
    let scope = match input.scope {
        Some(s) => s.to_string(),
        None => prior_access_token.map(|t| t.scope).unwrap_or_default(),
    };

    let issuer = format!("{issuer_base}/{}", tenant.code);
    let (kid, private_key) = keys.active_signing_key().await?;

    let access_jti = Uuid::new_v4();
    let now = Utc::now();
    let access_claims = AccessTokenClaims {
        iss: issuer,
        sub: session.user_id.to_string(),
        aud: client.client_id.clone(),
        exp: (now + chrono::Duration::seconds(tenant.access_token_lifetime_secs as i64)).timestamp(),
        iat: now.timestamp(),
        jti: access_jti,
        sid: session.id,
        scope: scope.clone(),
    };
    let (_, access_jws) = token::sign_access_token(&kid, &private_key, &access_claims)?;

    let access_token_row = store
        .create_access_token(store::access_tokens::NewAccessToken {
            jti: access_jti,
            session_id: session.id,
            client_id: client.id,
            scope: scope.clone(),
            lifetime_secs: tenant.access_token_lifetime_secs,
        })
        .await?;

    let (plaintext, hash) = token::generate_refresh_token();
    store
        .create_refresh_token(store::refresh_tokens::NewRefreshToken {
            token_hash: hash,
            parent_id: Some(rt.id),
            session_id: session.id,
            access_token_id: access_token_row.id,
            lifetime_secs: tenant.refresh_token_lifetime_secs,
        })
        .await?;

    Ok(TokenResponse {
        access_token: access_jws,
        token_type: "Bearer",
        expires_in: tenant.access_token_lifetime_secs as i64,
        refresh_token: Some(plaintext),
        id_token: None,
        scope,
    })
}

fn verify_client_secret(client: &crate::models::Client, provided: Option<&str>) -> Result<()> {
    let provided = provided.ok_or(OpError::InvalidClient)?;
    let ok = crypto::password::verify(provided, &client.client_secret_hash)
        .map_err(|_| OpError::InvalidClient)?;
    if ok && client.is_active() {
        Ok(())
    } else {
        Err(OpError::InvalidClient)
    }
}
