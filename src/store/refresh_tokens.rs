use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::RefreshToken;

pub struct NewRefreshToken {
    pub token_hash: String,
    pub parent_id: Option<Uuid>,
    pub session_id: Uuid,
    pub access_token_id: Uuid,
    pub lifetime_secs: i32,
}

pub async fn create(pool: &PgPool, input: NewRefreshToken) -> sqlx::Result<RefreshToken> {
    let expires_at = Utc::now() + Duration::seconds(input.lifetime_secs as i64);
    sqlx::query_as::<_, RefreshToken>(
        r#"
        INSERT INTO refresh_tokens (
            id, token_hash, parent_id, session_id, access_token_id, created_at, expires_at
        )
        VALUES ($1, $2, $3, $4, $5, now(), $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.token_hash)
    .bind(input.parent_id)
    .bind(input.session_id)
    .bind(input.access_token_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_token_hash(pool: &PgPool, token_hash: &str) -> sqlx::Result<Option<RefreshToken>> {
    sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_hash = $1")
        .bind(token_hash)
        .fetch_optional(pool)
        .await
}

pub async fn revoke(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = now() WHERE id = $1 AND revoked_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_by_session_id(pool: &PgPool, session_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE refresh_tokens SET revoked_at = now() WHERE session_id = $1 AND revoked_at IS NULL",
    )
    .bind(session_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn mark_reuse_detected(pool: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("UPDATE refresh_tokens SET reuse_detected_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn revoke_all(pool: &PgPool) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE refresh_tokens SET revoked_at = now() WHERE revoked_at IS NULL")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_by_tenant_id(pool: &PgPool, tenant_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE refresh_tokens SET revoked_at = now()
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
        UPDATE refresh_tokens SET revoked_at = now()
        WHERE revoked_at IS NULL
          AND session_id IN (SELECT id FROM sessions WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
