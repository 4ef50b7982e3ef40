//! OAuth provider trait and types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::token::{RefreshResult, Tokens};
use crate::error::Error;

/// Known OAuth providers for meeting recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Zoom,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Zoom => "zoom",
        }
    }
}

/// Authorization request with URL and state management data.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// CSRF state parameter for validation.
    pub state: String,
    /// PKCE verifier to be stored for later code exchange, when the
    /// provider flow uses PKCE.
    pub pkce_verifier: Option<String>,
}

/// User information retrieved from the OAuth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// Provider's unique account identifier.
    pub id: String,
    /// Account email address.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
}

/// Trait for OAuth 2.0 providers.
///
/// Implementations handle platform-specific OAuth flows including:
/// - Authorization URL generation
/// - Authorization code exchange for tokens
/// - Token refresh (including rotating refresh tokens for Zoom)
/// - Account info retrieval
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Generate the authorization URL with state and optional PKCE challenge.
    ///
    /// Pure URL construction, no network calls.
    fn authorization_url(&self, state: &str, pkce_challenge: Option<&str>) -> AuthorizationRequest;

    /// Exchange an authorization code for access and refresh tokens.
    ///
    /// Performs one network call and is never retried automatically: a
    /// rejected code (invalid, expired, already used) is not actionable
    /// on retry.
    async fn exchange_code(&self, code: &str, pkce_verifier: Option<&str>)
        -> Result<Tokens, Error>;

    /// Refresh an access token using a refresh token.
    ///
    /// Fails with `OAuthErrorKind::RevokedCredential` when the provider
    /// indicates the refresh token is no longer valid, versus
    /// `OAuthErrorKind::Network` for transport faults.
    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResult, Error>;

    /// Get account information for the authorized user.
    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error>;

    /// Returns true if this provider rotates refresh tokens (e.g., Zoom).
    ///
    /// When true, every refresh invalidates the prior refresh token and
    /// the manager must persist the rotated token immediately.
    fn uses_rotating_refresh_tokens(&self) -> bool {
        false
    }
}
