//! OAuth authentication gateway.
//!
//! Re-exports OAuth types from session-auth and provides provider-specific clients.

pub mod zoom;

// Re-export OAuth types from session-auth
pub use session_auth::oauth::{
    token::{Credential, EncryptedMemoryStorage, Manager, RefreshResult, Storage, Tokens},
    AuthorizationRequest, Provider, ProviderKind, UserInfo,
};

// Rate limiting for outbound provider calls, shared by the gateways.
pub use session_auth::http::{RateLimiter, RateLimiterConfig};
