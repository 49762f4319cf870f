use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::IdToken;

pub struct NewIdToken<'a> {
    pub jti: Uuid,
    pub session_id: Uuid,
    pub client_id: Uuid,
    pub nonce: Option<&'a str>,
    pub lifetime_secs: i32,
}

pub async fn create(pool: &PgPool, input: NewIdToken<'_>) -> sqlx::Result<IdToken> {
    let expires_at = Utc::now() + Duration::seconds(input.lifetime_secs as i64);
    sqlx::query_as::<_, IdToken>(
        r#"
        INSERT INTO id_tokens (id, jti, session_id, client_id, nonce, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, now(), $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.jti)
    .bind(input.session_id)
    .bind(input.client_id)
    .bind(input.nonce)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}
