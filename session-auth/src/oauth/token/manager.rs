//! Credential manager with per-user refresh locking.

use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, warn};
use secrecy::ExposeSecret;
use tokio::sync::Mutex;

use super::{Credential, Storage};
use crate::error::{token_error, Error, ErrorKind, OAuthErrorKind, TokenErrorKind};
use crate::oauth::Provider;

/// Credential manager that coordinates retrieval and refresh with
/// per-user locking.
///
/// The per-user locking prevents race conditions when multiple concurrent
/// requests for the same user trigger refreshes against a provider that
/// rotates refresh tokens: without it, both requests would refresh, one
/// would win, and the other's token would already be invalidated.
/// The locking is in-process only — a losing refresh racing another
/// process surfaces as `RevokedCredential`, which callers may treat as
/// retryable once at the top level.
pub struct Manager<S: Storage> {
    storage: S,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: Storage> Manager<S> {
    /// Create a new credential manager with the given storage backend.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            refresh_locks: DashMap::new(),
        }
    }

    /// Get a fresh credential for a user, refreshing if needed.
    ///
    /// This method:
    /// 1. Retrieves the stored credential
    /// 2. Checks whether it expires within the safety margin
    /// 3. If so, refreshes it (with per-user locking) and persists the result
    /// 4. Returns a credential whose expiry is beyond the margin
    ///
    /// If the provider reports the refresh token as revoked, the stored
    /// credential is deleted before the error propagates, so the caller
    /// can prompt re-authorization and a subsequent `get` sees nothing.
    pub async fn ensure_fresh<P: Provider>(
        &self,
        provider: &P,
        user_id: &str,
    ) -> Result<Credential, Error> {
        let provider_id = provider.provider().as_str();

        let credential = self
            .storage
            .get(user_id, provider_id)
            .await?
            .ok_or_else(|| token_error(TokenErrorKind::NotFound, "No credential found for user"))?;

        if !credential.is_expired() {
            return Ok(credential);
        }

        debug!("Credential expired for user {}, refreshing", user_id);

        // Get or create a lock for this user
        let lock = self
            .refresh_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let _guard = lock.lock().await;

        // Double-check after acquiring the lock: another request may have
        // refreshed while we waited.
        let credential = self
            .storage
            .get(user_id, provider_id)
            .await?
            .ok_or_else(|| {
                token_error(
                    TokenErrorKind::NotFound,
                    "Credential disappeared during refresh",
                )
            })?;

        if !credential.is_expired() {
            debug!("Credential was refreshed by another request");
            return Ok(credential);
        }

        let refresh_result = match provider
            .refresh_token(credential.refresh_token.expose_secret())
            .await
        {
            Ok(result) => result,
            Err(e) if e.error_kind == ErrorKind::OAuth(OAuthErrorKind::RevokedCredential) => {
                warn!(
                    "Refresh token revoked for user {}, deleting stored credential",
                    user_id
                );
                self.storage.delete(user_id, provider_id).await?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let refreshed = credential.refreshed(refresh_result)?;
        self.storage.put(provider_id, refreshed.clone()).await?;

        debug!("Credential refreshed successfully for user {}", user_id);

        Ok(refreshed)
    }

    /// Store a credential for a user.
    pub async fn store(&self, provider_id: &str, credential: Credential) -> Result<(), Error> {
        self.storage.put(provider_id, credential).await
    }

    /// Delete the credential for a user.
    pub async fn delete(&self, user_id: &str, provider_id: &str) -> Result<(), Error> {
        self.storage.delete(user_id, provider_id).await
    }

    /// Get the stored credential for a user (may be expired).
    pub async fn get(&self, user_id: &str, provider_id: &str) -> Result<Option<Credential>, Error> {
        self.storage.get(user_id, provider_id).await
    }
}
