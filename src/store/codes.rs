use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AuthorizationCode;

pub struct NewCode<'a> {
    pub session_id: Uuid,
    pub client_id: Uuid,
    pub code: &'a str,
    pub redirect_uri: &'a str,
    pub scope: &'a str,
    pub nonce: Option<&'a str>,
    pub code_challenge: Option<&'a str>,
    pub code_challenge_method: Option<&'a str>,
    pub lifetime_secs: i32,
}

pub async fn create(pool: &PgPool, input: NewCode<'_>) -> sqlx::Result<AuthorizationCode> {
    let expires_at = Utc::now() + Duration::seconds(input.lifetime_secs as i64);
    sqlx::query_as::<_, AuthorizationCode>(
        r#"
        INSERT INTO authorization_codes (
            id, session_id, client_id, code, redirect_uri, scope, nonce,
            code_challenge, code_challenge_method, created_at, expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.session_id)
    .bind(input.client_id)
    .bind(input.code)
    .bind(input.redirect_uri)
    .bind(input.scope)
    .bind(input.nonce)
    .bind(input.code_challenge)
    .bind(input.code_challenge_method)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_code(pool: &PgPool, code: &str) -> sqlx::Result<Option<AuthorizationCode>> {
    sqlx::query_as::<_, AuthorizationCode>("SELECT * FROM authorization_codes WHERE code = $1")
        .bind(code)
        .fetch_optional(pool)
        .await
}

/// Atomically marks a code as used, returning `None` if it was already
/// consumed — the single-winner guarantee concurrent redemption requires.
/// `used_at` is returned so callers can log/report when they lost the race.
pub async fn mark_used(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<DateTime<Utc>>> {
    let used_at: Option<DateTime<Utc>> = sqlx::query_scalar(
        "UPDATE authorization_codes SET used_at = now() WHERE id = $1 AND used_at IS NULL RETURNING used_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(used_at)
}
