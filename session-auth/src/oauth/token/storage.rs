//! Credential storage trait.

use async_trait::async_trait;

use super::Credential;
use crate::error::Error;

/// Trait for persisting OAuth credentials.
///
/// `put` is an upsert keyed on (user, provider): at most one credential
/// exists per pair. Implementations must reject credentials with an
/// empty refresh token at write time — a credential that can never be
/// refreshed is worse than no credential at all.
///
/// Implementations should:
/// - Encrypt tokens at rest (e.g., using AES-256-GCM)
/// - Handle concurrent access safely
/// - Raise only mechanical failures (backing store unavailable),
///   never domain errors
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store or replace the credential for a user and provider.
    ///
    /// # Arguments
    ///
    /// * `provider_id` - Provider identifier (e.g., "zoom")
    /// * `credential` - The credential to store
    async fn put(&self, provider_id: &str, credential: Credential) -> Result<(), Error>;

    /// Retrieve the credential for a user and provider.
    ///
    /// # Returns
    ///
    /// `Some(Credential)` if found, `None` if not found.
    async fn get(&self, user_id: &str, provider_id: &str) -> Result<Option<Credential>, Error>;

    /// Delete the credential for a user and provider.
    ///
    /// Deleting an absent credential is not an error.
    async fn delete(&self, user_id: &str, provider_id: &str) -> Result<(), Error>;
}
