//! AES-256-GCM encryption utilities for securing tokens stored at rest.
//!
//! Provides functions to encrypt and decrypt sensitive token data before
//! handing it to a storage backend. The encryption key should be a
//! 32-byte key provided as a hex-encoded string (64 characters).

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;

use crate::error::{Error, ErrorKind, StorageErrorKind};

/// 12-byte nonce size for AES-GCM
const NONCE_SIZE: usize = 12;

fn encryption_err() -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Storage(StorageErrorKind::EncryptionFailed),
    }
}

fn decryption_err() -> Error {
    Error {
        source: None,
        error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
    }
}

/// Encrypts plaintext using AES-256-GCM with a random nonce.
///
/// The nonce is prepended to the ciphertext, and the result is
/// base64-encoded for safe storage in a text column.
///
/// # Arguments
/// * `plaintext` - The data to encrypt
/// * `key_hex` - The 32-byte encryption key as a hex string (64 characters)
///
/// # Returns
/// Base64-encoded string containing nonce + ciphertext
pub fn encrypt(plaintext: &str, key_hex: &str) -> Result<String, Error> {
    let key = parse_key(key_hex)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| encryption_err())?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| encryption_err())?;

    let mut combined = nonce_bytes.to_vec();
    combined.extend(ciphertext);

    Ok(BASE64.encode(combined))
}

/// Decrypts a base64-encoded ciphertext that was encrypted with `encrypt()`.
///
/// # Arguments
/// * `ciphertext_b64` - Base64-encoded string containing nonce + ciphertext
/// * `key_hex` - The 32-byte encryption key as a hex string (64 characters)
///
/// # Returns
/// The original plaintext string
pub fn decrypt(ciphertext_b64: &str, key_hex: &str) -> Result<String, Error> {
    let key = parse_key(key_hex)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| decryption_err())?;

    let combined = BASE64.decode(ciphertext_b64).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
    })?;

    if combined.len() < NONCE_SIZE {
        return Err(decryption_err());
    }

    let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext_bytes = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| decryption_err())?;

    String::from_utf8(plaintext_bytes).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
    })
}

/// Parses a hex-encoded 32-byte key.
fn parse_key(key_hex: &str) -> Result<Vec<u8>, Error> {
    let key = hex::decode(key_hex).map_err(|_| encryption_err())?;

    if key.len() != 32 {
        return Err(encryption_err());
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let plaintext = "a-very-secret-refresh-token";
        let ciphertext = encrypt(plaintext, TEST_KEY).unwrap();
        assert_ne!(ciphertext, plaintext);

        let decrypted = decrypt(&ciphertext, TEST_KEY).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_produces_distinct_ciphertexts() {
        // Random nonce means the same plaintext never encrypts identically
        let a = encrypt("token", TEST_KEY).unwrap();
        let b = encrypt("token", TEST_KEY).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let ciphertext = encrypt("token", TEST_KEY).unwrap();
        let other_key = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
        assert!(decrypt(&ciphertext, other_key).is_err());
    }

    #[test]
    fn test_invalid_key_length_rejected() {
        assert!(encrypt("token", "abcd").is_err());
    }

    #[test]
    fn test_truncated_ciphertext_rejected() {
        assert!(decrypt("QUJD", TEST_KEY).is_err());
    }
}
