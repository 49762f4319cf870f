use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{PasswordCredential, User};

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_login_id(
    pool: &PgPool,
    tenant_id: Uuid,
    login_id: &str,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE tenant_id = $1 AND login_id = $2")
        .bind(tenant_id)
        .bind(login_id)
        .fetch_optional(pool)
        .await
}

/// Finds the active password credential's hash for a user, if one exists.
/// Mirrors the original's `findPasswordHash` helper (a user may in principle
/// have non-password credentials; only `type = 'password'` is consulted here).
pub async fn find_password_hash(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT pc.password_hash
        FROM password_credentials pc
        JOIN credentials c ON c.id = pc.credential_id
        WHERE c.user_id = $1 AND c.type = 'password'
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn update_last_login_at(pool: &PgPool, user_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET last_login_at = now(), updated_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub struct NewUser<'a> {
    pub tenant_id: Uuid,
    pub login_id: &'a str,
    pub email: &'a str,
    pub name: Option<&'a str>,
}

pub async fn create(pool: &PgPool, input: NewUser<'_>) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, tenant_id, login_id, email, email_verified, name, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, false, $5, 'active', now(), now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.tenant_id)
    .bind(input.login_id)
    .bind(input.email)
    .bind(input.name)
    .fetch_one(pool)
    .await
}

pub async fn set_password(pool: &PgPool, user_id: Uuid, password_hash: &str) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    let credential_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM credentials WHERE user_id = $1 AND type = 'password'",
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let credential_id = match credential_id {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO credentials (id, user_id, type, created_at) VALUES ($1, $2, 'password', now())",
            )
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            id
        }
    };

    sqlx::query(
        r#"
        INSERT INTO password_credentials (id, credential_id, password_hash, algorithm, updated_at)
        VALUES ($1, $2, $3, 'argon2id', now())
        ON CONFLICT (credential_id)
        DO UPDATE SET password_hash = EXCLUDED.password_hash, updated_at = now()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(credential_id)
    .bind(password_hash)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

#[allow(dead_code)]
pub async fn password_credential_for(
    pool: &PgPool,
    credential_id: Uuid,
) -> sqlx::Result<Option<PasswordCredential>> {
    sqlx::query_as::<_, PasswordCredential>(
        "SELECT * FROM password_credentials WHERE credential_id = $1",
    )
    .bind(credential_id)
    .fetch_optional(pool)
    .await
}
