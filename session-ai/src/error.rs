//! Error types for session AI operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// All provider implementations map their native errors to these variants,
/// preserving context while maintaining a provider-agnostic interface, so
/// the pipeline never needs provider-level error mapping.
#[derive(Debug)]
pub enum Error {
    /// API key authentication failures. Indicates credentials are invalid,
    /// expired, or lack necessary permissions.
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection timeouts.
    /// Typically transient and safe to retry.
    Network(String),

    /// Invalid parameters, missing required fields, or malformed configuration.
    Configuration(String),

    /// Provider-side failure (e.g., the model produced nothing usable,
    /// the audio format was rejected).
    Provider(String),

    /// Provider rate limit exceeded. Clients must wait before retrying.
    RateLimited { retry_after_seconds: u64 },

    /// Failed to parse the provider response into the expected structure.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

// Providers built on the session-auth HTTP client surface its errors here.
impl From<session_auth::Error> for Error {
    fn from(err: session_auth::Error) -> Self {
        match &err.error_kind {
            session_auth::ErrorKind::Http(_) => Error::Network(err.to_string()),
            session_auth::ErrorKind::ApiKey(_) => Error::Authentication(err.to_string()),
            _ => Error::Other(Box::new(err)),
        }
    }
}
