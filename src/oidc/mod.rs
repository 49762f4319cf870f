pub mod authorize;
pub mod discovery;
pub mod jwks;
pub mod ports;
pub mod revoke;
pub mod token;
pub mod token_authcode;
pub mod token_refresh;
pub mod userinfo;

use axum::http::{header, HeaderMap};

/// Shared client-authentication extraction for `/token` and `/revoke`: tries
/// `client_secret_post` form fields first, falling back to HTTP Basic
/// (`client_secret_basic`) only when the form omitted them — spec §4.6.
pub fn extract_client_credentials(
    headers: &HeaderMap,
    form_client_id: Option<&str>,
    form_client_secret: Option<&str>,
) -> Option<(String, String)> {
    if let (Some(id), Some(secret)) = (form_client_id, form_client_secret) {
        if !id.is_empty() && !secret.is_empty() {
            return Some((id.to_string(), secret.to_string()));
        }
    }
    basic_auth_credentials(headers)
}

fn basic_auth_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, pass) = text.split_once(':')?;
    if user.is_empty() || pass.is_empty() {
        return None;
    }
    Some((user.to_string(), pass.to_string()))
}
