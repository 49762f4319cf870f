use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AdminSession, AdminUser};

pub async fn find_user_by_login_id(pool: &PgPool, login_id: &str) -> sqlx::Result<Option<AdminUser>> {
    sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE login_id = $1")
        .bind(login_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<AdminUser>> {
    sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_session(pool: &PgPool, admin_user_id: Uuid, lifetime_secs: i64) -> sqlx::Result<AdminSession> {
    let expires_at = Utc::now() + Duration::seconds(lifetime_secs);
    sqlx::query_as::<_, AdminSession>(
        r#"
        INSERT INTO admin_sessions (id, admin_user_id, created_at, expires_at)
        VALUES ($1, $2, now(), $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(admin_user_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_session(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<AdminSession>> {
    sqlx::query_as::<_, AdminSession>("SELECT * FROM admin_sessions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
