use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::models::{Client, PostLogoutRedirectUri, RedirectUri};

pub async fn find_by_client_id(pool: &PgPool, client_id: &str) -> sqlx::Result<Option<Client>> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE client_id = $1")
        .bind(client_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Client>> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_for_tenant(pool: &PgPool, tenant_id: Uuid) -> sqlx::Result<Vec<Client>> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE tenant_id = $1 ORDER BY created_at")
        .bind(tenant_id)
        .fetch_all(pool)
        .await
}

pub struct NewClient<'a> {
    pub tenant_id: Uuid,
    pub client_id: &'a str,
    pub client_secret_hash: &'a str,
    pub name: &'a str,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub require_pkce: bool,
}

pub async fn create(pool: &PgPool, input: NewClient<'_>) -> sqlx::Result<Client> {
    sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (
            id, tenant_id, client_id, client_secret_hash, name, grant_types, response_types,
            token_endpoint_auth_method, require_pkce, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'client_secret_basic', $8, 'active', now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.tenant_id)
    .bind(input.client_id)
    .bind(input.client_secret_hash)
    .bind(input.name)
    .bind(Json(input.grant_types))
    .bind(Json(input.response_types))
    .bind(input.require_pkce)
    .fetch_one(pool)
    .await
}

pub async fn set_status(pool: &PgPool, id: Uuid, status: &str) -> sqlx::Result<Option<Client>> {
    sqlx::query_as::<_, Client>(
        "UPDATE clients SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
}

pub async fn set_secret_hash(pool: &PgPool, id: Uuid, secret_hash: &str) -> sqlx::Result<Option<Client>> {
    sqlx::query_as::<_, Client>(
        "UPDATE clients SET client_secret_hash = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(secret_hash)
    .fetch_optional(pool)
    .await
}

pub async fn redirect_uris(pool: &PgPool, client_id: Uuid) -> sqlx::Result<Vec<RedirectUri>> {
    sqlx::query_as::<_, RedirectUri>("SELECT * FROM redirect_uris WHERE client_id = $1")
        .bind(client_id)
        .fetch_all(pool)
        .await
}

pub async fn add_redirect_uri(pool: &PgPool, client_id: Uuid, uri: &str) -> sqlx::Result<RedirectUri> {
    sqlx::query_as::<_, RedirectUri>(
        "INSERT INTO redirect_uris (id, client_id, uri) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(client_id)
    .bind(uri)
    .fetch_one(pool)
    .await
}

pub async fn remove_redirect_uri(pool: &PgPool, client_id: Uuid, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM redirect_uris WHERE client_id = $1 AND id = $2")
        .bind(client_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn post_logout_redirect_uris(
    pool: &PgPool,
    client_id: Uuid,
) -> sqlx::Result<Vec<PostLogoutRedirectUri>> {
    sqlx::query_as::<_, PostLogoutRedirectUri>(
        "SELECT * FROM post_logout_redirect_uris WHERE client_id = $1",
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
}

pub async fn add_post_logout_redirect_uri(
    pool: &PgPool,
    client_id: Uuid,
    uri: &str,
) -> sqlx::Result<PostLogoutRedirectUri> {
    sqlx::query_as::<_, PostLogoutRedirectUri>(
        "INSERT INTO post_logout_redirect_uris (id, client_id, uri) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(client_id)
    .bind(uri)
    .fetch_one(pool)
    .await
}
