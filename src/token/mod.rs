pub mod claims;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pkcs1::EncodeRsaPrivateKey;
use rand::RngCore;
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

pub use claims::{AccessTokenClaims, IdTokenClaims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing failed: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
    #[error("no matching key id in JWKS")]
    UnknownKid,
    #[error("malformed key material: {0}")]
    Malformed(String),
}

/// Signs an ID token (OIDC Core 2) and returns `(jti, compact_jws)`. The jti
/// returned is parsed back out of `claims.jti` so it always matches what's
/// embedded in the token (the caller owns jti generation, same as
/// [`sign_access_token`]).
pub fn sign_id_token(
    kid: &str,
    private_key: &RsaPrivateKey,
    claims: &IdTokenClaims,
) -> Result<(Uuid, String), TokenError> {
    let jti = Uuid::parse_str(&claims.jti).map_err(|e| TokenError::Malformed(e.to_string()))?;
    let jws = sign(kid, private_key, claims)?;
    Ok((jti, jws))
}

/// Signs an access token JWT and returns `(jti, compact_jws)`.
pub fn sign_access_token(
    kid: &str,
    private_key: &RsaPrivateKey,
    claims: &AccessTokenClaims,
) -> Result<(Uuid, String), TokenError> {
    let jti: Uuid = claims.jti;
    let jws = sign(kid, private_key, claims)?;
    Ok((jti, jws))
}

fn sign<T: serde::Serialize>(
    kid: &str,
    private_key: &RsaPrivateKey,
    claims: &T,
) -> Result<String, TokenError> {
    let pem = private_key
        .to_pkcs1_pem(pkcs1::LineEnding::LF)
        .map_err(|e| TokenError::Malformed(e.to_string()))?;
    let encoding_key =
        EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| TokenError::Malformed(e.to_string()))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    Ok(encode(&header, claims, &encoding_key)?)
}

/// Verifies an access token JWT against the published JWKS and extracts its claims.
pub fn verify_access_token(jws: &str, jwks: &JwkSet) -> Result<AccessTokenClaims, TokenError> {
    let header = jsonwebtoken::decode_header(jws)?;
    let kid = header.kid.ok_or(TokenError::UnknownKid)?;
    let jwk = jwks.find(&kid).ok_or(TokenError::UnknownKid)?;
    let decoding_key =
        DecodingKey::from_jwk(jwk).map_err(|e| TokenError::Malformed(e.to_string()))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_aud = false;
    let data = decode::<AccessTokenClaims>(jws, &decoding_key, &validation)?;
    Ok(data.claims)
}

/// Generates an opaque refresh token: `(plaintext, sha256_hex(plaintext))`.
/// Only the hash is ever persisted.
pub fn generate_refresh_token() -> (String, String) {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let plaintext = hex::encode(bytes);
    let hash = crate::crypto::hash::sha256_hex(plaintext.as_bytes());
    (plaintext, hash)
}

/// Generates a 32-random-byte hex authorization code (spec §4.4).
pub fn generate_authorization_code() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// OIDC Core 3.1.3.6: left half of SHA-256(access_token), base64url no-pad.
pub fn compute_at_hash(access_token_jws: &str) -> String {
    let digest = Sha256::digest(access_token_jws.as_bytes());
    let half = &digest[..digest.len() / 2];
    URL_SAFE_NO_PAD.encode(half)
}

pub fn now_epoch() -> i64 {
    Utc::now().timestamp()
}
