use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Session;

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Session>> {
    sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub struct NewSession {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub lifetime_secs: i32,
}

pub async fn create(pool: &PgPool, input: NewSession) -> sqlx::Result<Session> {
    let expires_at = Utc::now() + Duration::seconds(input.lifetime_secs as i64);
    sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, tenant_id, ip_address, user_agent, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, now(), $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.user_id)
    .bind(input.tenant_id)
    .bind(input.ip_address)
    .bind(input.user_agent)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn revoke(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE sessions SET revoked_at = now() WHERE id = $1 AND revoked_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_all(pool: &PgPool) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE sessions SET revoked_at = now() WHERE revoked_at IS NULL")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_by_tenant_id(pool: &PgPool, tenant_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE sessions SET revoked_at = now() WHERE tenant_id = $1 AND revoked_at IS NULL",
    )
    .bind(tenant_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn revoke_by_user_id(pool: &PgPool, user_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE sessions SET revoked_at = now() WHERE user_id = $1 AND revoked_at IS NULL",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
