//! Gateways to third-party provider APIs.

pub mod oauth;
pub mod openai;
pub mod zoom;
