use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use rand::rngs::OsRng;

use super::CryptoError;

/// m=65536 (64 MiB), t=3, p=4 — matches the reference argon2id parameters this
/// implementation was distilled from.
fn argon2() -> Argon2<'static> {
    let params = Params::new(65536, 3, 4, Some(32)).expect("static argon2 params are valid");
    Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params)
}

/// Hashes a password, returning the PHC string (`$argon2id$v=19$m=65536,t=3,p=4$...`).
pub fn hash(password: &str) -> Result<String, CryptoError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CryptoError::Hash(e.to_string()))
}

/// Verifies a password against a previously stored PHC string.
pub fn verify(password: &str, encoded: &str) -> Result<bool, CryptoError> {
    let parsed = PasswordHash::new(encoded).map_err(|e| CryptoError::Hash(e.to_string()))?;
    Ok(argon2().verify_password(password.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let encoded = hash("correct horse battery staple").unwrap();
        assert!(encoded.starts_with("$argon2id$v=19$m=65536,t=3,p=4$"));
        assert!(verify("correct horse battery staple", &encoded).unwrap());
        assert!(!verify("wrong password", &encoded).unwrap());
    }

    #[test]
    fn distinct_salts_for_same_password() {
        let a = hash("same password").unwrap();
        let b = hash("same password").unwrap();
        assert_ne!(a, b);
    }
}
