//! API key authentication trait and implementation.

use reqwest_middleware::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

/// Known API key providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyProvider {
    OpenAi,
}

impl ApiKeyProvider {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyProvider::OpenAi => "openai",
        }
    }
}

/// Authentication method for HTTP requests.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Custom header with optional prefix
    ApiKeyHeader {
        header_name: String,
        prefix: Option<String>,
    },
    /// Standard Bearer token
    BearerToken,
}

/// Trait for authenticating HTTP requests with API keys or bearer tokens.
///
/// Implementations handle provider-specific authentication patterns, e.g.
/// OpenAI's `Authorization: Bearer xxx`.
pub trait ProviderAuth: Send + Sync {
    /// Get the provider identifier.
    fn provider(&self) -> ApiKeyProvider;

    /// Get the authentication method used by this provider.
    fn auth_method(&self) -> AuthMethod;

    /// Apply authentication to a request builder.
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder;
}

/// API key authentication implementation.
pub struct ApiKeyAuth {
    provider: ApiKeyProvider,
    api_key: SecretString,
}

impl ApiKeyAuth {
    /// Create a new API key authenticator.
    pub fn new(provider: ApiKeyProvider, api_key: SecretString) -> Self {
        Self { provider, api_key }
    }

    /// Get a reference to the API key.
    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

impl ProviderAuth for ApiKeyAuth {
    fn provider(&self) -> ApiKeyProvider {
        self.provider
    }

    fn auth_method(&self) -> AuthMethod {
        AuthMethod::BearerToken
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            "Authorization",
            format!("Bearer {}", self.api_key.expose_secret()),
        )
    }
}
