//! # session-auth
//!
//! Single source of truth for third-party credential handling in the
//! Momentum backend:
//! - OAuth 2.0 infrastructure (credentials, storage, refresh, per-user locking)
//! - OAuth provider implementations (Zoom)
//! - API key authentication for AI service providers (OpenAI)
//! - HTTP client building with retry middleware
//! - Process-wide outbound rate limiting
//!
//! ## Architecture
//!
//! This crate provides the credential foundation that other crates build upon:
//! - `domain` gateways use the rate limiter and refresh manager for provider APIs
//! - the OpenAI gateway uses API key auth and the HTTP client builder
//!
//! ## Usage
//!
//! ```rust,ignore
//! use session_auth::{
//!     api_key::{ApiKeyAuth, ProviderAuth},
//!     http::{AuthenticatedClientBuilder, RateLimiter},
//!     oauth::{Provider, token::{Manager, Storage}},
//! };
//! ```

pub mod api_key;
pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
