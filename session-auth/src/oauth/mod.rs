//! OAuth 2.0 infrastructure: provider trait, credential types, storage,
//! and the refresh manager.

pub mod provider;
pub mod providers;
pub mod token;

pub use provider::{AuthorizationRequest, Provider, ProviderKind, UserInfo};
