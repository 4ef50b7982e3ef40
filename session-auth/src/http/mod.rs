//! HTTP client building, retry policy, and outbound rate limiting.

mod client;
mod rate_limit;
mod retry;

pub use client::{AuthenticatedClient, AuthenticatedClientBuilder, HttpClientConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::{RetryAfterMiddleware, TransientRetryStrategy};
