pub mod tenants;
pub mod clients;
pub mod users;
pub mod sessions;
pub mod codes;
pub mod access_tokens;
pub mod refresh_tokens;
pub mod id_tokens;
pub mod sign_keys;
pub mod admin;

/// Thin handle over the connection pool. Repository functions are free
/// functions taking `&PgPool` (teacher's `db::user_repo::*` convention); `Store`
/// exists so the `oidc::ports` capability traits have a single concrete type to
/// attach `impl`s to.
#[derive(Clone)]
pub struct Store {
    pub pool: sqlx::PgPool,
}

impl Store {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}
