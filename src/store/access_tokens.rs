use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AccessToken;

pub struct NewAccessToken {
    pub jti: Uuid,
    pub session_id: Uuid,
    pub client_id: Uuid,
    pub scope: String,
    pub lifetime_secs: i32,
}

pub async fn create(pool: &PgPool, input: NewAccessToken) -> sqlx::Result<AccessToken> {
    let expires_at = Utc::now() + Duration::seconds(input.lifetime_secs as i64);
    sqlx::query_as::<_, AccessToken>(
        r#"
        INSERT INTO access_tokens (id, jti, session_id, client_id, scope, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, now(), $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.jti)
    .bind(input.session_id)
    .bind(input.client_id)
    .bind(input.scope)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_jti(pool: &PgPool, jti: Uuid) -> sqlx::Result<Option<AccessToken>> {
    sqlx::query_as::<_, AccessToken>("SELECT * FROM access_tokens WHERE jti = $1")
        .bind(jti)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<AccessToken>> {
    sqlx::query_as::<_, AccessToken>("SELECT * FROM access_tokens WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn revoke(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE access_tokens SET revoked_at = now() WHERE id = $1 AND revoked_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_by_jti(pool: &PgPool, jti: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE access_tokens SET revoked_at = now() WHERE jti = $1 AND revoked_at IS NULL",
    )
    .bind(jti)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_by_session_id(pool: &PgPool, session_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE access_tokens SET revoked_at = now() WHERE session_id = $1 AND revoked_at IS NULL",
    )
    .bind(session_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_all(pool: &PgPool) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE access_tokens SET revoked_at = now() WHERE revoked_at IS NULL")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_by_tenant_id(pool: &PgPool, tenant_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE access_tokens SET revoked_at = now()
        WHERE revoked_at IS NULL
          AND session_id IN (SELECT id FROM sessions WHERE tenant_id = $1)
        "#,
    )
    .bind(tenant_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_by_user_id(pool: &PgPool, user_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE access_tokens SET revoked_at = now()
        WHERE revoked_at IS NULL
          AND session_id IN (SELECT id FROM sessions WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
