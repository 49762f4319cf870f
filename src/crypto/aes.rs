use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

use super::CryptoError;

const NONCE_LEN: usize = 12;

/// Encrypts `plaintext` under `key` (exactly 32 bytes). Output is
/// `base64_standard(nonce || ciphertext_with_tag)`.
pub fn encrypt(plaintext: &[u8], key: &[u8; 32]) -> Result<String, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::Encrypt(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(out))
}

/// Reverses [`encrypt`].
pub fn decrypt(encoded: &str, key: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    let raw = STANDARD
        .decode(encoded)
        .map_err(|e| CryptoError::Decrypt(e.to_string()))?;

    if raw.len() < NONCE_LEN {
        return Err(CryptoError::Decrypt("ciphertext shorter than nonce".into()));
    }

    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| CryptoError::Decrypt(e.to_string()))?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| CryptoError::Decrypt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> [u8; 32] {
        [7u8; 32]
    }

    #[test]
    fn round_trips() {
        let sealed = encrypt(b"top secret pem contents", &key()).unwrap();
        let opened = decrypt(&sealed, &key()).unwrap();
        assert_eq!(opened, b"top secret pem contents");
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let mut sealed = encrypt(b"hello", &key()).unwrap();
        sealed.push('A');
        assert!(decrypt(&sealed, &key()).is_err());
    }

    #[test]
    fn rejects_wrong_key() {
        let sealed = encrypt(b"hello", &key()).unwrap();
        assert!(decrypt(&sealed, &[9u8; 32]).is_err());
    }
}
