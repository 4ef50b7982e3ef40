//! In-memory credential storage with at-rest encryption.
//!
//! Backing-store mechanics are deliberately behind the `Storage` trait;
//! a database-backed implementation plugs into the same seam. Tokens are
//! encrypted with AES-256-GCM even in memory so the encryption path is
//! exercised identically regardless of backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use super::{encryption, Credential, Storage};
use crate::error::{storage_error, Error, StorageErrorKind};

/// One stored row: encrypted tokens plus plaintext metadata.
#[derive(Debug, Clone)]
struct StoredCredential {
    user_id: String,
    encrypted_access_token: String,
    encrypted_refresh_token: String,
    expires_at: DateTime<Utc>,
    provider_user_id: Option<String>,
    provider_email: Option<String>,
}

/// Encrypted in-memory credential storage.
///
/// Keyed on (user, provider); `put` is an upsert so the at-most-one
/// credential invariant holds by construction.
pub struct EncryptedMemoryStorage {
    encryption_key: String,
    rows: RwLock<HashMap<(String, String), StoredCredential>>,
}

impl EncryptedMemoryStorage {
    /// Create a new storage with the given hex-encoded 32-byte key.
    pub fn new(encryption_key: String) -> Self {
        Self {
            encryption_key,
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn decrypt_row(&self, row: &StoredCredential) -> Result<Credential, Error> {
        let access_token = encryption::decrypt(&row.encrypted_access_token, &self.encryption_key)?;
        let refresh_token =
            encryption::decrypt(&row.encrypted_refresh_token, &self.encryption_key)?;

        Ok(Credential {
            user_id: row.user_id.clone(),
            access_token: SecretString::from(access_token),
            refresh_token: SecretString::from(refresh_token),
            expires_at: row.expires_at,
            provider_user_id: row.provider_user_id.clone(),
            provider_email: row.provider_email.clone(),
        })
    }
}

#[async_trait]
impl Storage for EncryptedMemoryStorage {
    async fn put(&self, provider_id: &str, credential: Credential) -> Result<(), Error> {
        if credential.refresh_token.expose_secret().is_empty() {
            return Err(storage_error(
                StorageErrorKind::Backend,
                "Refusing to store a credential with an empty refresh token",
            ));
        }

        let row = StoredCredential {
            user_id: credential.user_id.clone(),
            encrypted_access_token: encryption::encrypt(
                credential.access_token.expose_secret(),
                &self.encryption_key,
            )?,
            encrypted_refresh_token: encryption::encrypt(
                credential.refresh_token.expose_secret(),
                &self.encryption_key,
            )?,
            expires_at: credential.expires_at,
            provider_user_id: credential.provider_user_id.clone(),
            provider_email: credential.provider_email.clone(),
        };

        let mut rows = self.rows.write().await;
        rows.insert(
            (credential.user_id.clone(), provider_id.to_string()),
            row,
        );
        Ok(())
    }

    async fn get(&self, user_id: &str, provider_id: &str) -> Result<Option<Credential>, Error> {
        let rows = self.rows.read().await;
        rows.get(&(user_id.to_string(), provider_id.to_string()))
            .map(|row| self.decrypt_row(row))
            .transpose()
    }

    async fn delete(&self, user_id: &str, provider_id: &str) -> Result<(), Error> {
        let mut rows = self.rows.write().await;
        rows.remove(&(user_id.to_string(), provider_id.to_string()));
        Ok(())
    }
}
