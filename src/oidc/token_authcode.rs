use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    crypto,
    error::{OpError, Result},
    oidc::ports::{
        AccessTokenStore, AuthorizationCodeStore, ClientFinder, IdTokenStore, RefreshTokenStore,
        SessionValidator, TenantFinder, TokenSigner,
    },
    store,
    token::{self, AccessTokenClaims, IdTokenClaims},
};

pub struct AuthCodeGrantInput<'a> {
    pub client_id: &'a str,
    pub client_secret: Option<&'a str>,
    pub code: &'a str,
    pub redirect_uri: &'a str,
    pub code_verifier: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    pub scope: String,
}

/// spec §4.6 "Token" / `authorization_code` grant. Ported from the reference
/// implementation's `handleAuthCodeGrantLogic`, including the replay-detection
/// short circuit: redeeming an already-used code revokes the whole session's
/// live tokens rather than just rejecting the one request.
pub async fn grant<S, K>(store: &S, keys: &K, issuer_base: &str, input: AuthCodeGrantInput<'_>) -> Result<TokenResponse>
where
    S: ClientFinder
        + AuthorizationCodeStore
        + AccessTokenStore
        + RefreshTokenStore
        + SessionValidator
        + TenantFinder
        + IdTokenStore,
    K: TokenSigner,
{
    let client = store
        .find_client(input.client_id)
        .await?
        .ok_or(OpError::InvalidClient)?;
    verify_client_secret(&client, input.client_secret)?;

    let auth_code = store
        .find_code(input.code)
        .await?
        .ok_or_else(|| OpError::InvalidGrant("unknown authorization code".into()))?;

    if auth_code.is_used() {
        // Reuse of a spent code: treat the whole session as compromised.
        store.revoke_access_tokens_by_session(auth_code.session_id).await?;
        store.revoke_refresh_tokens_by_session(auth_code.session_id).await?;
        return Err(OpError::InvalidGrant("authorization code already used".into()));
    }

    if auth_code.is_expired() {
        return Err(OpError::InvalidGrant("authorization code expired".into()));
    }
    if auth_code.client_id != client.id {
        return Err(OpError::InvalidGrant("authorization code was issued to a different client".into()));
    }
    if auth_code.redirect_uri != input.redirect_uri {
        return Err(OpError::InvalidGrant("redirect_uri does not match".into()));
    }

    if let Some(challenge) = &auth_code.code_challenge {
        let verifier = input
            .code_verifier
            .ok_or_else(|| OpError::InvalidGrant("code_verifier is required".into()))?;
        if !crypto::pkce::verify_s256(verifier, challenge) {
            return Err(OpError::InvalidGrant("code_verifier does not match code_challenge".into()));
        }
    }

    if !store.mark_code_used(auth_code.id).await? {
        // Lost a race with a concurrent redemption of the same code.
        store.revoke_access_tokens_by_session(auth_code.session_id).await?;
        store.revoke_refresh_tokens_by_session(auth_code.session_id).await?;
        return Err(OpError::InvalidGrant("authorization code already used".into()));
    }

    let session = store
        .find_session(auth_code.session_id)
        .await?
        .ok_or_else(|| OpError::InvalidGrant("session no longer exists".into()))?;
    let tenant = store
        .find_tenant_by_id(session.tenant_id)
        .await?
        .ok_or_else(|| OpError::Internal("tenant for session vanished".into()))?;

    let issuer = format!("{issuer_base}/{}", tenant_code(&tenant));
    let (kid, private_key) = keys.active_signing_key().await?;

    let access_jti = Uuid::new_v4();
    let now = Utc::now();
    let access_claims = AccessTokenClaims {
        iss: issuer.clone(),
        sub: session.user_id.to_string(),
        aud: client.client_id.clone(),
        exp: (now + chrono::Duration::seconds(tenant.access_token_lifetime_secs as i64)).timestamp(),
        iat: now.timestamp(),
        jti: access_jti,
        sid: session.id,
        scope: auth_code.scope.clone(),
    };
    let (_, access_jws) = token::sign_access_token(&kid, &private_key, &access_claims)?;

    let access_token_row = store
        .create_access_token(store::access_tokens::NewAccessToken {
            jti: access_jti,
            session_id: session.id,
            client_id: client.id,
            scope: auth_code.scope.clone(),
            lifetime_secs: tenant.access_token_lifetime_secs,
        })
        .await?;

    let at_hash = token::compute_at_hash(&access_jws);
    let id_claims = IdTokenClaims {
        iss: issuer,
        sub: session.user_id.to_string(),
        aud: client.client_id.clone(),
        exp: (now + chrono::Duration::seconds(tenant.id_token_lifetime_secs as i64)).timestamp(),
        iat: now.timestamp(),
        auth_time: session.created_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
        nonce: auth_code.nonce.clone(),
        at_hash: Some(at_hash),
    };
    let (id_jti, id_jws) = token::sign_id_token(&kid, &private_key, &id_claims)?;

    store
        .create_id_token(store::id_tokens::NewIdToken {
            jti: id_jti,
            session_id: session.id,
            client_id: client.id,
            nonce: auth_code.nonce.as_deref(),
            lifetime_secs: tenant.id_token_lifetime_secs,
        })
        .await?;

    let refresh_token = if client.has_grant_type("refresh_token") {
        let (plaintext, hash) = token::generate_refresh_token();
        store
            .create_refresh_token(store::refresh_tokens::NewRefreshToken {
                token_hash: hash,
                parent_id: None,
                session_id: session.id,
                access_token_id: access_token_row.id,
                lifetime_secs: tenant.refresh_token_lifetime_secs,
            })
            .await?;
        Some(plaintext)
    } else {
        None
    };

    Ok(TokenResponse {
        access_token: access_jws,
        token_type: "Bearer",
        expires_in: tenant.access_token_lifetime_secs as i64,
        refresh_token,
        id_token: Some(id_jws),
        scope: auth_code.scope,
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

fn tenant_code(tenant: &crate::models::Tenant) -> &str {
    &tenant.code
}
