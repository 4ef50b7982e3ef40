//! OAuth credential types.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{token_error, Error, TokenErrorKind};

/// Safety margin before the real expiry at which a credential is treated
/// as expired and refreshed.
pub const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// Raw OAuth tokens as returned by a provider token endpoint.
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: Option<SecretString>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

/// Result of a token refresh operation.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    /// The new tokens.
    pub tokens: Tokens,
    /// True if the refresh token was rotated (Zoom behavior).
    pub refresh_token_rotated: bool,
}

impl RefreshResult {
    /// Create a refresh result with no rotation.
    pub fn no_rotation(tokens: Tokens) -> Self {
        Self {
            tokens,
            refresh_token_rotated: false,
        }
    }

    /// Create a refresh result with rotation.
    pub fn with_rotation(tokens: Tokens) -> Self {
        Self {
            tokens,
            refresh_token_rotated: true,
        }
    }
}

/// A stored credential linking one local user to one provider account.
///
/// A credential always carries a refresh token and an absolute expiry;
/// provider responses missing either are rejected at construction time
/// rather than stored in a state that can never be refreshed.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Local user identifier the credential belongs to.
    pub user_id: String,
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: SecretString,
    /// Absolute expiry of the access token.
    pub expires_at: DateTime<Utc>,
    /// Provider-side account identifier.
    pub provider_user_id: Option<String>,
    /// Provider-side account email.
    pub provider_email: Option<String>,
}

impl Credential {
    /// Build a credential from a token-endpoint response.
    ///
    /// Fails with `TokenErrorKind::Invalid` if the response carries no
    /// refresh token or no expiry.
    pub fn from_tokens(user_id: &str, tokens: Tokens) -> Result<Self, Error> {
        let refresh_token = tokens.refresh_token.ok_or_else(|| {
            token_error(
                TokenErrorKind::Invalid,
                "Provider returned no refresh token",
            )
        })?;
        if refresh_token.expose_secret().is_empty() {
            return Err(token_error(
                TokenErrorKind::Invalid,
                "Provider returned an empty refresh token",
            ));
        }
        let expires_at = tokens.expires_at.ok_or_else(|| {
            token_error(TokenErrorKind::Invalid, "Provider returned no token expiry")
        })?;

        Ok(Self {
            user_id: user_id.to_string(),
            access_token: tokens.access_token,
            refresh_token,
            expires_at,
            provider_user_id: None,
            provider_email: None,
        })
    }

    /// Attach the provider-side account identity.
    pub fn with_account(mut self, provider_user_id: String, provider_email: String) -> Self {
        self.provider_user_id = Some(provider_user_id);
        self.provider_email = Some(provider_email);
        self
    }

    /// Apply a refresh result, keeping the account identity fields.
    ///
    /// When the provider did not rotate the refresh token the existing
    /// one is kept.
    pub fn refreshed(&self, result: RefreshResult) -> Result<Self, Error> {
        let refresh_token = match result.tokens.refresh_token {
            Some(rt) if !rt.expose_secret().is_empty() => rt,
            _ if !result.refresh_token_rotated => self.refresh_token.clone(),
            _ => {
                return Err(token_error(
                    TokenErrorKind::Invalid,
                    "Rotating provider returned no refresh token",
                ))
            }
        };
        let expires_at = result.tokens.expires_at.ok_or_else(|| {
            token_error(TokenErrorKind::Invalid, "Refresh returned no token expiry")
        })?;

        Ok(Self {
            user_id: self.user_id.clone(),
            access_token: result.tokens.access_token,
            refresh_token,
            expires_at,
            provider_user_id: self.provider_user_id.clone(),
            provider_email: self.provider_email.clone(),
        })
    }

    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if the token is expired or will expire within the
    /// safety margin.
    pub fn is_expired(&self) -> bool {
        let buffer = chrono::Duration::minutes(EXPIRY_MARGIN_MINUTES);
        self.expires_at <= (Utc::now() + buffer)
    }

    /// Get the remaining time until expiration.
    pub fn time_until_expiry(&self) -> chrono::Duration {
        self.expires_at - Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential_expiring_in(d: Duration) -> Credential {
        Credential {
            user_id: "user1".to_string(),
            access_token: SecretString::from("access".to_string()),
            refresh_token: SecretString::from("refresh".to_string()),
            expires_at: Utc::now() + d,
            provider_user_id: None,
            provider_email: None,
        }
    }

    #[test]
    fn test_credential_not_expired() {
        assert!(!credential_expiring_in(Duration::hours(1)).is_expired());
    }

    #[test]
    fn test_credential_expired() {
        assert!(credential_expiring_in(Duration::hours(-1)).is_expired());
    }

    #[test]
    fn test_credential_within_margin_is_expired() {
        // 60 seconds out with a 5 minute margin must trigger a refresh
        assert!(credential_expiring_in(Duration::seconds(60)).is_expired());
    }

    #[test]
    fn test_from_tokens_rejects_missing_refresh_token() {
        let tokens = Tokens {
            access_token: SecretString::from("access".to_string()),
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
            token_type: "Bearer".to_string(),
            scopes: vec![],
        };

        let result = Credential::from_tokens("user1", tokens);
        assert!(result.is_err());
    }

    #[test]
    fn test_refreshed_keeps_account_identity() {
        let credential = credential_expiring_in(Duration::seconds(30)).with_account(
            "zoom-abc".to_string(),
            "coach@example.com".to_string(),
        );

        let result = RefreshResult::with_rotation(Tokens {
            access_token: SecretString::from("new-access".to_string()),
            refresh_token: Some(SecretString::from("new-refresh".to_string())),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            token_type: "Bearer".to_string(),
            scopes: vec![],
        });

        let refreshed = credential.refreshed(result).unwrap();
        assert_eq!(refreshed.provider_user_id.as_deref(), Some("zoom-abc"));
        assert_eq!(
            refreshed.provider_email.as_deref(),
            Some("coach@example.com")
        );
        assert_eq!(refreshed.refresh_token.expose_secret(), "new-refresh");
        assert!(!refreshed.is_expired());
    }

    #[test]
    fn test_refreshed_without_rotation_keeps_refresh_token() {
        let credential = credential_expiring_in(Duration::seconds(30));

        let result = RefreshResult::no_rotation(Tokens {
            access_token: SecretString::from("new-access".to_string()),
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::hours(1)),
            token_type: "Bearer".to_string(),
            scopes: vec![],
        });

        let refreshed = credential.refreshed(result).unwrap();
        assert_eq!(refreshed.refresh_token.expose_secret(), "refresh");
    }
}
