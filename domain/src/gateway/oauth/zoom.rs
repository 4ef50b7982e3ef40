//! Zoom OAuth client.
//!
//! Provides a configured Zoom OAuth provider for domain operations.

use session_auth::oauth::providers::zoom::{Provider as ZoomProvider, ZoomOAuthUrls};

/// Create a new Zoom OAuth provider.
///
/// # Arguments
///
/// * `client_id` - Zoom OAuth client ID from config
/// * `client_secret` - Zoom OAuth client secret from config
/// * `redirect_uri` - OAuth redirect URI from config
/// * `oauth_base_url` - Base URL for the authorize/token endpoints
/// * `api_base_url` - Base URL for the REST API (`/users/me`)
///
/// Both base URLs are overridable so tests can point at a mock server.
///
/// # Returns
///
/// A configured Zoom OAuth provider ready for use.
pub fn new_provider(
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    oauth_base_url: &str,
    api_base_url: &str,
) -> ZoomProvider {
    let oauth_base = oauth_base_url.trim_end_matches('/');
    let api_base = api_base_url.trim_end_matches('/');
    let urls = ZoomOAuthUrls {
        authorize_url: format!("{}/oauth/authorize", oauth_base),
        token_url: format!("{}/oauth/token", oauth_base),
        userinfo_url: format!("{}/users/me", api_base),
    };
    ZoomProvider::with_urls(client_id, client_secret, redirect_uri, urls)
}
