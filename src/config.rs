use serde::Deserialize;

/// Process configuration, loaded once at startup from the environment.
///
/// Field names mirror the `OP_*` environment variables via `envy`'s
/// prefix-stripping rename, following the teacher's `Config::from_env` pattern.
#[derive(Clone, Deserialize)]
pub struct Config {
    pub backend_port: u16,
    pub backend_dsn: String,
    /// Base URL this OP is reachable at, e.g. `https://auth.example.com`.
    /// Per-tenant issuers are `{backend_base_url}/{tenant_code}`.
    pub backend_base_url: String,
    /// Origin the browser-facing login UI lives at; the authorize endpoint
    /// redirects here when no session is present.
    pub frontend_base_url: String,
    /// 64 hex characters (32 bytes) used to seal signing-key private material.
    pub key_encryption_key: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("backend_port", &self.backend_port)
            .field("backend_dsn", &"[redacted]")
            .field("backend_base_url", &self.backend_base_url)
            .field("frontend_base_url", &self.frontend_base_url)
            .field("key_encryption_key", &"[redacted]")
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Loads config from `OP_*` env vars. `backend_base_url` is right-trimmed
    /// of any trailing slash here, once, so every derived issuer string
    /// (discovery, token grants, JWKS URI) is built from the same normalized
    /// value (spec §4.7 / §6).
    pub fn from_env() -> Result<Self, envy::Error> {
        let mut config = envy::prefixed("OP_").from_env::<Config>()?;
        config.backend_base_url = config.backend_base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Parses `key_encryption_key` into the 32-byte KEK used for AES-256-GCM
    /// sealing of signing-key private material.
    pub fn kek_bytes(&self) -> anyhow::Result<[u8; 32]> {
        let raw = hex::decode(&self.key_encryption_key)
            .map_err(|e| anyhow::anyhow!("OP_KEY_ENCRYPTION_KEY is not valid hex: {e}"))?;
        raw.try_into()
            .map_err(|v: Vec<u8>| anyhow::anyhow!("OP_KEY_ENCRYPTION_KEY must decode to 32 bytes, got {}", v.len()))
    }

    /// The issuer for a given tenant: `{base_url}/{tenant_code}`, no trailing slash.
    pub fn issuer_for(&self, tenant_code: &str) -> String {
        format!("{}/{}", self.backend_base_url, tenant_code)
    }

    pub fn is_secure(&self) -> bool {
        self.backend_base_url.starts_with("https://")
    }
}
