pub mod handlers;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    crypto,
    error::{OpError, Result},
    models::{Session, User},
    store,
};

pub struct LoginInput<'a> {
    pub tenant_code: &'a str,
    pub login_id: &'a str,
    pub password: &'a str,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

pub struct LoginOutput {
    pub session: Session,
    pub user: User,
}

/// Authenticates an end user within a tenant and opens a session. All failure
/// modes collapse to `InvalidCredentials` to avoid leaking whether a tenant,
/// login id, or password was the wrong part (mirrors the original auth service).
pub async fn login(pool: &PgPool, input: LoginInput<'_>) -> Result<LoginOutput> {
    let tenant = store::tenants::find_by_code(pool, input.tenant_code)
        .await?
        .ok_or(OpError::InvalidCredentials)?;

    let user = store::users::find_by_login_id(pool, tenant.id, input.login_id)
        .await?
        .ok_or(OpError::InvalidCredentials)?;

    if !user.is_active() {
        return Err(OpError::InvalidCredentials);
    }

    let password_hash = store::users::find_password_hash(pool, user.id)
        .await?
        .ok_or(OpError::InvalidCredentials)?;

    let ok = crypto::password::verify(input.password, &password_hash)
        .map_err(|e| OpError::Internal(e.to_string()))?;
    if !ok {
        return Err(OpError::InvalidCredentials);
    }

    let session = store::sessions::create(
        pool,
        store::sessions::NewSession {
            user_id: user.id,
            tenant_id: tenant.id,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            lifetime_secs: tenant.session_lifetime_secs,
        },
    )
    .await?;

    // Best-effort: a failure to stamp last_login_at must not fail the login.
    if let Err(e) = store::users::update_last_login_at(pool, user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "failed to update last_login_at");
    }

    Ok(LoginOutput { session, user })
}

/// Validates a session id pulled from the `op_session` cookie.
pub async fn validate_session(pool: &PgPool, session_id: Uuid) -> Result<Session> {
    let session = store::sessions::find_by_id(pool, session_id)
        .await?
        .ok_or(OpError::SessionNotFound)?;
    if !session.is_valid() {
        return Err(OpError::SessionExpired);
    }
    Ok(session)
}
