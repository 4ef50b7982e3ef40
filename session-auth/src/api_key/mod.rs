//! API key authentication for AI service providers.

mod auth;

pub use auth::{ApiKeyAuth, ApiKeyProvider, AuthMethod, ProviderAuth};
