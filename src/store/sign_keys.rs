use sqlx::PgPool;
use uuid::Uuid;

use crate::models::SignKey;

pub struct NewSignKey<'a> {
    pub kid: &'a str,
    pub public_key: &'a str,
    pub private_key_sealed: &'a str,
}

pub async fn create(pool: &PgPool, input: NewSignKey<'_>) -> sqlx::Result<SignKey> {
    sqlx::query_as::<_, SignKey>(
        r#"
        INSERT INTO sign_keys (id, kid, algorithm, public_key, private_key_sealed, active, created_at)
        VALUES ($1, $2, 'RS256', $3, $4, true, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.kid)
    .bind(input.public_key)
    .bind(input.private_key_sealed)
    .fetch_one(pool)
    .await
}

pub async fn find_active(pool: &PgPool) -> sqlx::Result<Option<SignKey>> {
    sqlx::query_as::<_, SignKey>(
        "SELECT * FROM sign_keys WHERE active = true ORDER BY created_at DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}

pub async fn find_all_active(pool: &PgPool) -> sqlx::Result<Vec<SignKey>> {
    sqlx::query_as::<_, SignKey>("SELECT * FROM sign_keys WHERE active = true ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_kid(pool: &PgPool, kid: &str) -> sqlx::Result<Option<SignKey>> {
    sqlx::query_as::<_, SignKey>("SELECT * FROM sign_keys WHERE kid = $1")
        .bind(kid)
        .fetch_optional(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> sqlx::Result<Vec<SignKey>> {
    sqlx::query_as::<_, SignKey>("SELECT * FROM sign_keys ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

pub async fn deactivate_all_active(pool: &PgPool) -> sqlx::Result<u64> {
    let result = sqlx::query("UPDATE sign_keys SET active = false, rotated_at = now() WHERE active = true")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn deactivate(pool: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE sign_keys SET active = false, rotated_at = now() WHERE id = $1 AND active = true",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
