use oidc_provider::{config::Config, keys::KeyService, routes, store::Store, telemetry, AppState};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().expect("failed to load configuration from environment");

    telemetry::init(&config.log_level);

    tracing::info!(port = config.backend_port, "starting oidc-provider");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.backend_dsn)
        .await?;
    tracing::info!("database connection pool initialized");

    let kek = config.kek_bytes()?;
    let keys = KeyService::new(pool.clone(), kek);
    keys.ensure_signing_key().await?;
    tracing::info!("signing key bootstrap complete");

    let state = AppState {
        config: config.clone(),
        store: Store::new(pool),
        keys,
    };

    let app = routes::build(state);

    let addr = format!("0.0.0.0:{}", config.backend_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
