use chrono::Utc;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse, RSAKeyParameters,
    RSAKeyType,
};
use pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use pkcs8::{DecodePublicKey, EncodePublicKey};
use rand::rngs::OsRng;
use rsa::{traits::PublicKeyParts, BigUint, RsaPrivateKey, RsaPublicKey};
use sqlx::PgPool;
use thiserror::Error;

use crate::{crypto, models::SignKey, store};

const RSA_BITS: usize = 2048;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no active signing key")]
    NoActiveKey,
    #[error("malformed signing key material: {0}")]
    Malformed(String),
    #[error(transparent)]
    Crypto(#[from] crypto::CryptoError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("refusing to deactivate the last active signing key")]
    LastActiveKey,
    #[error("key not found")]
    NotFound,
    #[error("key already inactive")]
    AlreadyInactive,
}

/// Owns the RSA signing-key lifecycle: generation, at-rest sealing, JWKS
/// publishing, and rotation (spec §4.2).
#[derive(Clone)]
pub struct KeyService {
    pool: PgPool,
    kek: [u8; 32],
}

impl KeyService {
    pub fn new(pool: PgPool, kek: [u8; 32]) -> Self {
        Self { pool, kek }
    }

    /// Idempotent bootstrap: generates a key only if none is active yet.
    pub async fn ensure_signing_key(&self) -> Result<(), KeyError> {
        if store::sign_keys::find_active(&self.pool).await?.is_some() {
            return Ok(());
        }
        self.generate_and_save().await?;
        Ok(())
    }

    /// Deactivates the current active key(s) and generates a fresh one.
    pub async fn rotate(&self) -> Result<SignKey, KeyError> {
        store::sign_keys::deactivate_all_active(&self.pool).await?;
        self.generate_and_save().await
    }

    async fn generate_and_save(&self) -> Result<SignKey, KeyError> {
        let private_key =
            RsaPrivateKey::new(&mut OsRng, RSA_BITS).map_err(|e| KeyError::Malformed(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs1_pem(pkcs1::LineEnding::LF)
            .map_err(|e| KeyError::Malformed(e.to_string()))?;
        let public_pem = public_key
            .to_public_key_pem(pkcs8::LineEnding::LF)
            .map_err(|e| KeyError::Malformed(e.to_string()))?;

        let sealed = crypto::aes::encrypt(private_pem.as_bytes(), &self.kek)?;
        let kid = format!("{}-{}", Utc::now().format("%Y-%m-%d"), random_hex8());

        let key = store::sign_keys::create(
            &self.pool,
            store::sign_keys::NewSignKey {
                kid: &kid,
                public_key: &public_pem,
                private_key_sealed: &sealed,
            },
        )
        .await?;
        Ok(key)
    }

    /// Returns the `(kid, private_key)` pair currently used to sign new tokens.
    pub async fn active_signing_key(&self) -> Result<(String, RsaPrivateKey), KeyError> {
        let row = store::sign_keys::find_active(&self.pool)
            .await?
            .ok_or(KeyError::NoActiveKey)?;
        let pem = crypto::aes::decrypt(&row.private_key_sealed, &self.kek)?;
        let pem = String::from_utf8(pem).map_err(|e| KeyError::Malformed(e.to_string()))?;
        let private_key =
            RsaPrivateKey::from_pkcs1_pem(&pem).map_err(|e| KeyError::Malformed(e.to_string()))?;
        Ok((row.kid, private_key))
    }

    /// Builds the published JWK set from all active keys, skipping any row
    /// whose public key fails to parse rather than failing the whole request.
    pub async fn jwk_set(&self) -> Result<JwkSet, KeyError> {
        let rows = store::sign_keys::find_all_active(&self.pool).await?;
        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            match public_key_to_jwk(&row) {
                Ok(jwk) => keys.push(jwk),
                Err(e) => {
                    tracing::warn!(kid = %row.kid, error = %e, "skipping unparsable signing key in JWKS");
                }
            }
        }
        Ok(JwkSet { keys })
    }

    pub async fn list_all(&self) -> Result<Vec<SignKey>, KeyError> {
        Ok(store::sign_keys::list_all(&self.pool).await?)
    }

    /// Refuses to deactivate the last active key (invariant K1).
    pub async fn deactivate(&self, kid: &str) -> Result<(), KeyError> {
        let key = store::sign_keys::find_by_kid(&self.pool, kid)
            .await?
            .ok_or(KeyError::NotFound)?;
        if !key.active {
            return Err(KeyError::AlreadyInactive);
        }
        let active = store::sign_keys::find_all_active(&self.pool).await?;
        if active.len() <= 1 {
            return Err(KeyError::LastActiveKey);
        }
        store::sign_keys::deactivate(&self.pool, key.id).await?;
        Ok(())
    }
}

fn random_hex8() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 4];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn public_key_to_jwk(row: &SignKey) -> Result<Jwk, KeyError> {
    let public_key =
        RsaPublicKey::from_public_key_pem(&row.public_key).map_err(|e| KeyError::Malformed(e.to_string()))?;

    let n = BigUint::from_bytes_be(&public_key.n().to_bytes_be());
    let e = BigUint::from_bytes_be(&public_key.e().to_bytes_be());

    Ok(Jwk {
        common: CommonParameters {
            public_key_use: Some(PublicKeyUse::Signature),
            key_algorithm: Some(KeyAlgorithm::RS256),
            key_id: Some(row.kid.clone()),
            ..Default::default()
        },
        algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
            key_type: RSAKeyType::RSA,
            n: base64_url(&n.to_bytes_be()),
            e: base64_url(&e.to_bytes_be()),
        }),
    })
}

fn base64_url(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    URL_SAFE_NO_PAD.encode(bytes)
}
