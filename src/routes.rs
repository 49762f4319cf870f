use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth::handlers as auth_handlers, management, oidc, AppState};

/// Assembles the full axum [`Router`] — flat method/path pairs mirroring the
/// teacher's `main.rs` route table, one `TraceLayer` over the whole app, a
/// `CorsLayer` scoped to the configured login UI origin (spec §6), and the
/// admin-only subtree gated by [`management::auth::require_admin_session`].
pub fn build(state: AppState) -> Router {
    let cors = match HeaderValue::from_str(state.config.frontend_base_url.trim_end_matches('/')) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(_) => CorsLayer::new(),
    };
    let public = Router::new()
        .route("/healthz", get(healthz))
        .route("/jwks", get(oidc::jwks::jwks))
        .route("/:tenant_code/.well-known/openid-configuration", get(oidc::discovery::discovery))
        .route("/:tenant_code/authorize", get(oidc::authorize::authorize))
        .route("/:tenant_code/token", post(oidc::token::token))
        .route("/:tenant_code/userinfo", get(oidc::userinfo::userinfo))
        .route("/:tenant_code/revoke", post(oidc::revoke::revoke))
        .route("/internal/login", post(auth_handlers::login))
        .route("/internal/me", get(auth_handlers::me));

    let management_auth = Router::new()
        .route("/auth/login", post(management::auth::login))
        .route("/auth/me", get(management::auth::me));

    let management_protected = Router::new()
        .route("/tenants", get(management::tenant::list).post(management::tenant::create))
        .route("/tenants/:id", get(management::tenant::get).patch(management::tenant::update))
        .route("/tenants/:tenant_id/clients", get(management::client::list).post(management::client::create))
        .route("/clients/:id", get(management::client::get))
        .route("/clients/:id/status", patch(management::client::set_status))
        .route("/clients/:id/rotate-secret", post(management::client::rotate_secret))
        .route("/clients/:id/redirect-uris", post(management::client::add_redirect_uri))
        .route("/clients/:id/redirect-uris/:redirect_uri_id", delete(management::client::remove_redirect_uri))
        .route("/keys", get(management::key::list))
        .route("/keys/rotate", post(management::key::rotate))
        .route("/keys/:kid", delete(management::key::deactivate))
        .route("/incidents/revoke-all-tokens", post(management::incident::revoke_all))
        .route("/incidents/revoke-tenant-tokens", post(management::incident::revoke_tenant))
        .route("/incidents/revoke-user-tokens", post(management::incident::revoke_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), management::auth::require_admin_session));

    public
        .nest("/management/v1", management_auth.merge(management_protected))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "OK"
}
