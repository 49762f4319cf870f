//! End-to-end exercises of the authorization_code and refresh_token grant
//! engines against the in-memory fixtures, covering the literal scenarios the
//! happy path and the adversarial edge cases (replay, PKCE mismatch,
//! redirect_uri tamper, refresh rotation + reuse detection) exercise.

mod common;

use chrono::Utc;
use common::{FakeSigner, InMemoryStore};
use oidc_provider::{
    crypto,
    error::OpError,
    models::{Client, Session, Tenant},
    oidc::{
        token_authcode::{self, AuthCodeGrantInput},
        token_refresh::{self, RefreshGrantInput},
    },
    store,
};
use sqlx::types::Json;
use uuid::Uuid;

const ISSUER_BASE: &str = "https://idp.example.test";

fn make_tenant() -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        code: "acme".to_string(),
        name: "Acme".to_string(),
        session_lifetime_secs: Tenant::DEFAULT_SESSION_LIFETIME_SECS,
        auth_code_lifetime_secs: Tenant::DEFAULT_AUTH_CODE_LIFETIME_SECS,
        access_token_lifetime_secs: Tenant::DEFAULT_ACCESS_TOKEN_LIFETIME_SECS,
        refresh_token_lifetime_secs: Tenant::DEFAULT_REFRESH_TOKEN_LIFETIME_SECS,
        id_token_lifetime_secs: Tenant::DEFAULT_ID_TOKEN_LIFETIME_SECS,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn make_client(tenant_id: Uuid, secret_hash: String) -> Client {
    Client {
        id: Uuid::new_v4(),
        tenant_id,
        client_id: "client-1".to_string(),
        client_secret_hash: secret_hash,
        name: "Test Client".to_string(),
        grant_types: Json(vec!["authorization_code".to_string(), "refresh_token".to_string()]),
        response_types: Json(vec!["code".to_string()]),
        token_endpoint_auth_method: "client_secret_basic".to_string(),
        require_pkce: true,
        frontchannel_logout_uri: None,
        backchannel_logout_uri: None,
        status: "active".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn make_session(user_id: Uuid, tenant_id: Uuid) -> Session {
    Session {
        id: Uuid::new_v4(),
        user_id,
        tenant_id,
        ip_address: None,
        user_agent: None,
        created_at: Utc::now(),
        expires_at: Utc::now() + chrono::Duration::hours(8),
        revoked_at: None,
    }
}

/// Seeds a store with one tenant/client/session and a fresh PKCE-protected
/// authorization code, returning the plaintext code verifier alongside it.
async fn seed_with_code(store: &InMemoryStore) -> (Tenant, Client, Session, String, String) {
    let tenant = make_tenant();
    let secret_hash = crypto::password::hash("client-secret").unwrap();
    let client = make_client(tenant.id, secret_hash);
    let session = make_session(Uuid::new_v4(), tenant.id);

    store.tenants.lock().unwrap().push(tenant.clone());
    store.clients.lock().unwrap().push(client.clone());
    store.sessions.lock().unwrap().push(session.clone());

    let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    let challenge = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

    let code = store
        .create_code(store::codes::NewCode {
            session_id: session.id,
            client_id: client.id,
            code: "test-auth-code",
            redirect_uri: "https://client.example.test/callback",
            scope: "openid profile",
            nonce: Some("n-0s6_WzA2Mj"),
            code_challenge: Some(challenge),
            code_challenge_method: Some("S256"),
            lifetime_secs: tenant.auth_code_lifetime_secs,
        })
        .await
        .unwrap();

    (tenant, client, session, code.code, verifier.to_string())
}

#[tokio::test]
async fn authorization_code_grant_happy_path_issues_tokens() {
    let store = InMemoryStore::default();
    let signer = FakeSigner::new();
    let (_, _, _, code, verifier) = seed_with_code(&store).await;

    let response = token_authcode::grant(
        &store,
        &signer,
        ISSUER_BASE,
        AuthCodeGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            code: &code,
            redirect_uri: "https://client.example.test/callback",
            code_verifier: Some(&verifier),
        },
    )
    .await
    .expect("grant should succeed");

    assert_eq!(response.token_type, "Bearer");
    assert!(response.refresh_token.is_some());
    assert!(response.id_token.is_some());
    assert_eq!(response.scope, "openid profile");
    assert_eq!(store.access_tokens.lock().unwrap().len(), 1);
    assert_eq!(store.id_tokens.lock().unwrap().len(), 1);
    assert_eq!(store.refresh_tokens.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn replayed_authorization_code_revokes_the_session() {
    let store = InMemoryStore::default();
    let signer = FakeSigner::new();
    let (_, _, session, code, verifier) = seed_with_code(&store).await;

    token_authcode::grant(
        &store,
        &signer,
        ISSUER_BASE,
        AuthCodeGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            code: &code,
            redirect_uri: "https://client.example.test/callback",
            code_verifier: Some(&verifier),
        },
    )
    .await
    .expect("first redemption succeeds");

    let result = token_authcode::grant(
        &store,
        &signer,
        ISSUER_BASE,
        AuthCodeGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            code: &code,
            redirect_uri: "https://client.example.test/callback",
            code_verifier: Some(&verifier),
        },
    )
    .await;

    assert!(matches!(result, Err(OpError::InvalidGrant(_))));
    let access_tokens = store.access_tokens.lock().unwrap();
    assert!(access_tokens.iter().all(|t| t.session_id != session.id || t.revoked_at.is_some()));
}

#[tokio::test]
async fn mismatched_code_verifier_is_rejected() {
    let store = InMemoryStore::default();
    let signer = FakeSigner::new();
    let (_, _, _, code, _) = seed_with_code(&store).await;

    let result = token_authcode::grant(
        &store,
        &signer,
        ISSUER_BASE,
        AuthCodeGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            code: &code,
            redirect_uri: "https://client.example.test/callback",
            code_verifier: Some("wrong-verifier"),
        },
    )
    .await;

    assert!(matches!(result, Err(OpError::InvalidGrant(_))));
    assert!(store.access_tokens.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tampered_redirect_uri_is_rejected() {
    let store = InMemoryStore::default();
    let signer = FakeSigner::new();
    let (_, _, _, code, verifier) = seed_with_code(&store).await;

    let result = token_authcode::grant(
        &store,
        &signer,
        ISSUER_BASE,
        AuthCodeGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            code: &code,
            redirect_uri: "https://attacker.example.test/callback",
            code_verifier: Some(&verifier),
        },
    )
    .await;

    assert!(matches!(result, Err(OpError::InvalidGrant(_))));
}

#[tokio::test]
async fn refresh_grant_rotates_token_and_preserves_scope() {
    let store = InMemoryStore::default();
    let signer = FakeSigner::new();
    let (_, _, _, code, verifier) = seed_with_code(&store).await;

    let first = token_authcode::grant(
        &store,
        &signer,
        ISSUER_BASE,
        AuthCodeGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            code: &code,
            redirect_uri: "https://client.example.test/callback",
            code_verifier: Some(&verifier),
        },
    )
    .await
    .unwrap();
    let original_refresh_token = first.refresh_token.unwrap();

    let rotated = token_refresh::grant(
        &store,
        &signer,
        ISSUER_BASE,
        RefreshGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            refresh_token: &original_refresh_token,
            scope: None,
        },
    )
    .await
    .expect("rotation should succeed");

    assert_eq!(rotated.scope, "openid profile");
    assert_ne!(rotated.refresh_token.as_deref(), Some(original_refresh_token.as_str()));
    assert_eq!(store.refresh_tokens.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn reused_refresh_token_revokes_the_whole_session() {
    let store = InMemoryStore::default();
    let signer = FakeSigner::new();
    let (_, _, session, code, verifier) = seed_with_code(&store).await;

    let first = token_authcode::grant(
        &store,
        &signer,
        ISSUER_BASE,
        AuthCodeGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            code: &code,
            redirect_uri: "https://client.example.test/callback",
            code_verifier: Some(&verifier),
        },
    )
    .await
    .unwrap();
    let original_refresh_token = first.refresh_token.unwrap();

    // Legitimate rotation.
    token_refresh::grant(
        &store,
        &signer,
        ISSUER_BASE,
        RefreshGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            refresh_token: &original_refresh_token,
            scope: None,
        },
    )
    .await
    .unwrap();

    // An attacker replays the now-retired refresh token.
    let result = token_refresh::grant(
        &store,
        &signer,
        ISSUER_BASE,
        RefreshGrantInput {
            client_id: "client-1",
            client_secret: Some("client-secret"),
            refresh_token: &original_refresh_token,
            scope: None,
        },
    )
    .await;

    assert!(matches!(result, Err(OpError::InvalidGrant(_))));

    let refresh_tokens = store.refresh_tokens.lock().unwrap();
    assert!(refresh_tokens
        .iter()
        .filter(|t| t.session_id == session.id)
        .all(|t| t.revoked_at.is_some()));
    assert!(refresh_tokens
        .iter()
        .find(|t| t.id != Uuid::nil())
        .map(|t| t.reuse_detected_at.is_some() || t.revoked_at.is_some())
        .unwrap_or(false));
}

#[tokio::test]
async fn wrong_client_secret_is_rejected() {
    let store = InMemoryStore::default();
    let signer = FakeSigner::new();
    let (_, _, _, code, verifier) = seed_with_code(&store).await;

    let result = token_authcode::grant(
        &store,
        &signer,
        ISSUER_BASE,
        AuthCodeGrantInput {
            client_id: "client-1",
            client_secret: Some("not-the-secret"),
            code: &code,
            redirect_uri: "https://client.example.test/callback",
            code_verifier: Some(&verifier),
        },
    )
    .await;

    assert!(matches!(result, Err(OpError::InvalidClient)));
}
