use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber. Honors `RUST_LOG` if set, else
/// falls back to the level configured via `OP_LOG_LEVEL`.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
