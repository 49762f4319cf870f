use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Tenant;

pub async fn find_by_code(pool: &PgPool, code: &str) -> sqlx::Result<Option<Tenant>> {
    sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE code = $1")
        .bind(code)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Tenant>> {
    sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool) -> sqlx::Result<Vec<Tenant>> {
    sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at")
        .fetch_all(pool)
        .await
}

pub struct NewTenant<'a> {
    pub code: &'a str,
    pub name: &'a str,
}

pub async fn create(pool: &PgPool, input: NewTenant<'_>) -> sqlx::Result<Tenant> {
    sqlx::query_as::<_, Tenant>(
        r#"
        INSERT INTO tenants (
            id, code, name, session_lifetime_secs, auth_code_lifetime_secs,
            access_token_lifetime_secs, refresh_token_lifetime_secs, id_token_lifetime_secs,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.code)
    .bind(input.name)
    .bind(Tenant::DEFAULT_SESSION_LIFETIME_SECS)
    .bind(Tenant::DEFAULT_AUTH_CODE_LIFETIME_SECS)
    .bind(Tenant::DEFAULT_ACCESS_TOKEN_LIFETIME_SECS)
    .bind(Tenant::DEFAULT_REFRESH_TOKEN_LIFETIME_SECS)
    .bind(Tenant::DEFAULT_ID_TOKEN_LIFETIME_SECS)
    .fetch_one(pool)
    .await
}

pub async fn update_name(pool: &PgPool, id: Uuid, name: &str) -> sqlx::Result<Option<Tenant>> {
    sqlx::query_as::<_, Tenant>(
        "UPDATE tenants SET name = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await
}
