//! Zoom OAuth provider implementation.
//!
//! Handles OAuth 2.0 flows for Zoom accounts:
//! - Authorization URL generation
//! - Authorization code exchange (HTTP Basic client authentication)
//! - Token refresh with rotating refresh tokens
//! - Account info retrieval from the Zoom API

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::token::{RefreshResult, Tokens};
use crate::oauth::{AuthorizationRequest, ProviderKind, UserInfo};

/// Scopes requested for recording access.
const SCOPES: &str = "recording:read recording:write meeting:read user:read";

/// Token response from the Zoom token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Error body returned by the Zoom token endpoint.
#[derive(Debug, Deserialize, Default)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    reason: String,
}

/// Account info from the Zoom `/users/me` endpoint.
#[derive(Debug, Deserialize)]
struct ZoomUserResponse {
    id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Configuration for Zoom OAuth URLs.
///
/// Overridable so tests can point at a mock server.
#[derive(Debug, Clone)]
pub struct ZoomOAuthUrls {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for ZoomOAuthUrls {
    fn default() -> Self {
        Self {
            authorize_url: "https://zoom.us/oauth/authorize".to_string(),
            token_url: "https://zoom.us/oauth/token".to_string(),
            userinfo_url: "https://api.zoom.us/v2/users/me".to_string(),
        }
    }
}

/// Zoom OAuth provider.
pub struct Provider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    urls: ZoomOAuthUrls,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new Zoom OAuth provider with default Zoom URLs.
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self::with_urls(client_id, client_secret, redirect_uri, ZoomOAuthUrls::default())
    }

    /// Create a new Zoom OAuth provider with configurable URLs.
    pub fn with_urls(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        urls: ZoomOAuthUrls,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            urls,
            http_client: reqwest::Client::new(),
        }
    }

    fn tokens_from_response(response: TokenResponse) -> Tokens {
        let expires_at: DateTime<Utc> = Utc::now() + chrono::Duration::seconds(response.expires_in);
        Tokens {
            access_token: SecretString::from(response.access_token),
            refresh_token: response.refresh_token.map(SecretString::from),
            expires_at: Some(expires_at),
            token_type: response.token_type,
            scopes: response
                .scope
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    async fn post_token_request(
        &self,
        form: &[(&str, &str)],
    ) -> Result<reqwest::Response, Error> {
        self.http_client
            .post(&self.urls.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Zoom token endpoint unreachable: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: crate::error::ErrorKind::OAuth(OAuthErrorKind::Network),
                }
            })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Zoom
    }

    fn authorization_url(&self, state: &str, _pkce_challenge: Option<&str>) -> AuthorizationRequest {
        let url = format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.urls.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state)
        );

        AuthorizationRequest {
            url,
            state: state.to_string(),
            pkce_verifier: None,
        }
    }

    async fn exchange_code(
        &self,
        code: &str,
        _pkce_verifier: Option<&str>,
    ) -> Result<Tokens, Error> {
        debug!("Exchanging Zoom authorization code for tokens");

        let response = self
            .post_token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
            ])
            .await?;

        if response.status().is_success() {
            let tokens: TokenResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Zoom token response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: crate::error::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
                }
            })?;
            info!("Successfully exchanged Zoom authorization code for tokens");
            Ok(Self::tokens_from_response(tokens))
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Zoom code exchange rejected ({}): {}", status, error_text);

            // A provider-side fault may succeed on retry; a rejected code
            // (invalid, expired, already used) never will.
            if status.is_server_error() {
                Err(oauth_error(OAuthErrorKind::Network, &error_text))
            } else {
                Err(oauth_error(OAuthErrorKind::InvalidCode, &error_text))
            }
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResult, Error> {
        debug!("Refreshing Zoom access token");

        let response = self
            .post_token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        if response.status().is_success() {
            let tokens: TokenResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Zoom token refresh response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: crate::error::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
                }
            })?;
            info!("Successfully refreshed Zoom access token");
            // Zoom rotates refresh tokens on every refresh
            Ok(RefreshResult::with_rotation(Self::tokens_from_response(
                tokens,
            )))
        } else {
            let status = response.status();
            let body: TokenErrorResponse = response.json().await.unwrap_or_default();
            warn!(
                "Zoom token refresh rejected ({}): error={} reason={}",
                status, body.error, body.reason
            );

            // `invalid_grant` (or a flat 401) means the refresh token is
            // permanently invalid; the stored credential must be discarded.
            if body.error == "invalid_grant" || status == reqwest::StatusCode::UNAUTHORIZED {
                Err(oauth_error(OAuthErrorKind::RevokedCredential, &body.reason))
            } else if status.is_server_error() {
                Err(oauth_error(OAuthErrorKind::Network, &body.reason))
            } else {
                Err(oauth_error(OAuthErrorKind::RefreshFailed, &body.reason))
            }
        }
    }

    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error> {
        let response = self
            .http_client
            .get(&self.urls.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get Zoom user info: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: crate::error::ErrorKind::OAuth(OAuthErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let user: ZoomUserResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Zoom user info: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: crate::error::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
                }
            })?;
            Ok(UserInfo {
                id: user.id,
                email: user.email,
                name: user.display_name,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Zoom user info error: {}", error_text);
            Err(oauth_error(OAuthErrorKind::InvalidResponse, &error_text))
        }
    }

    fn uses_rotating_refresh_tokens(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Provider as _;
    use secrecy::ExposeSecret;

    fn provider_for(server: &mockito::ServerGuard) -> Provider {
        Provider::with_urls(
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://app.example.com/oauth/zoom/callback".to_string(),
            ZoomOAuthUrls {
                authorize_url: format!("{}/oauth/authorize", server.url()),
                token_url: format!("{}/oauth/token", server.url()),
                userinfo_url: format!("{}/v2/users/me", server.url()),
            },
        )
    }

    #[test]
    fn test_authorization_url_carries_required_params() {
        let provider = Provider::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://app.example.com/cb".to_string(),
        );

        let request = provider.authorization_url("user-42", None);
        assert!(request.url.starts_with("https://zoom.us/oauth/authorize?"));
        assert!(request.url.contains("response_type=code"));
        assert!(request.url.contains("client_id=client-id"));
        assert!(request.url.contains("state=user-42"));
        assert!(request.url.contains("recording%3Aread"));
        assert_eq!(request.state, "user-42");
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_header("authorization", mockito::Matcher::Regex("^Basic ".to_string()))
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                mockito::Matcher::UrlEncoded("code".into(), "auth-code".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"access_token":"at","refresh_token":"rt","expires_in":3600,"token_type":"bearer","scope":"recording:read"}"#,
            )
            .create_async()
            .await;

        let provider = provider_for(&server);
        let tokens = provider.exchange_code("auth-code", None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token.expose_secret(), "at");
        assert_eq!(
            tokens.refresh_token.as_ref().unwrap().expose_secret(),
            "rt"
        );
        assert!(tokens.expires_at.unwrap() > Utc::now());
        assert_eq!(tokens.scopes, vec!["recording:read"]);
    }

    #[tokio::test]
    async fn test_exchange_rejected_code_is_invalid_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_request","reason":"Invalid authorization code"}"#)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let err = provider.exchange_code("bad-code", None).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::error::ErrorKind::OAuth(OAuthErrorKind::InvalidCode)
        );
    }

    #[tokio::test]
    async fn test_exchange_during_outage_is_network_not_invalid_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let provider = provider_for(&server);
        let err = provider.exchange_code("auth-code", None).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::error::ErrorKind::OAuth(OAuthErrorKind::Network)
        );
    }

    #[tokio::test]
    async fn test_refresh_token_rotates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                mockito::Matcher::UrlEncoded("refresh_token".into(), "old-rt".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"access_token":"new-at","refresh_token":"new-rt","expires_in":3600,"token_type":"bearer","scope":""}"#,
            )
            .create_async()
            .await;

        let provider = provider_for(&server);
        let result = provider.refresh_token("old-rt").await.unwrap();
        assert!(result.refresh_token_rotated);
        assert_eq!(result.tokens.access_token.expose_secret(), "new-at");
    }

    #[tokio::test]
    async fn test_refresh_invalid_grant_is_revoked() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","reason":"Refresh token revoked"}"#)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let err = provider.refresh_token("revoked-rt").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::error::ErrorKind::OAuth(OAuthErrorKind::RevokedCredential)
        );
    }

    #[tokio::test]
    async fn test_refresh_server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let provider = provider_for(&server);
        let err = provider.refresh_token("rt").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::error::ErrorKind::OAuth(OAuthErrorKind::Network)
        );
    }

    #[tokio::test]
    async fn test_get_user_info() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/users/me")
            .match_header("authorization", "Bearer at")
            .with_status(200)
            .with_body(r#"{"id":"zoom-123","email":"coach@example.com","display_name":"Coach"}"#)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let info = provider.get_user_info("at").await.unwrap();
        assert_eq!(info.id, "zoom-123");
        assert_eq!(info.email, "coach@example.com");
        assert_eq!(info.name.as_deref(), Some("Coach"));
    }
}
