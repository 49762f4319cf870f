pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod management;
pub mod models;
pub mod oidc;
pub mod routes;
pub mod store;
pub mod telemetry;
pub mod token;

pub use config::Config;
pub use error::{OpError, Result};

use keys::KeyService;
use store::Store;

/// Shared application state, the teacher's `AppState` pattern generalized to
/// this service's three long-lived handles: immutable config, the Postgres
/// pool wrapped in [`Store`], and the signing-key service. No other
/// process-global state exists (spec §9).
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub keys: KeyService,
}
