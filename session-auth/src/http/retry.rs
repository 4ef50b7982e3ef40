//! Retry middleware for outbound provider calls.
//!
//! Transient faults (5xx, dropped connections) are retried with
//! exponential backoff by `reqwest-retry`. Throttle responses are handled
//! separately: `RetryAfterMiddleware` waits out the provider's
//! `Retry-After` hint before re-sending instead of guessing a delay.

use std::time::Duration;

use http::Extensions;
use log::*;
use reqwest::{header, Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use reqwest_retry::{default_on_request_failure, Retryable, RetryableStrategy};

/// Upper bound on how long a `Retry-After` hint is honored.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Fallback delay when a throttle response carries no usable hint.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Retry strategy for the transient-failure middleware.
///
/// Retries server faults and connection failures only. 429 is excluded
/// here and owned by `RetryAfterMiddleware`, so a throttle response is
/// never retried by two layers at once.
pub struct TransientRetryStrategy;

impl RetryableStrategy for TransientRetryStrategy {
    fn handle(
        &self,
        res: &Result<Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(response) if response.status().is_server_error() => Some(Retryable::Transient),
            Ok(_) => None,
            Err(error) => default_on_request_failure(error),
        }
    }
}

/// Middleware that retries throttled requests after the provider's
/// `Retry-After` delay.
pub struct RetryAfterMiddleware {
    max_retries: u32,
}

impl RetryAfterMiddleware {
    /// Create the middleware with a retry budget.
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Delay before the next attempt: the `Retry-After` hint when the
    /// response carries one (capped), exponential backoff otherwise.
    fn delay_for(response: &Response, n_past_retries: u32) -> Duration {
        let hinted = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs);

        match hinted {
            Some(delay) => delay.min(MAX_RETRY_AFTER),
            None => DEFAULT_RETRY_AFTER * 2_u32.saturating_pow(n_past_retries),
        }
    }
}

#[async_trait::async_trait]
impl Middleware for RetryAfterMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let mut n_past_retries = 0;

        loop {
            let duplicate = match req.try_clone() {
                Some(duplicate) => duplicate,
                // Streaming bodies cannot be replayed, send once as-is
                None => return next.run(req, extensions).await,
            };

            let response = next.clone().run(duplicate, extensions).await?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS
                || n_past_retries >= self.max_retries
            {
                return Ok(response);
            }

            let delay = Self::delay_for(&response, n_past_retries);
            warn!(
                "{} answered 429, waiting {:?} before retry {} of {}",
                req.url(),
                delay,
                n_past_retries + 1,
                self.max_retries
            );
            tokio::time::sleep(delay).await;
            n_past_retries += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::AuthenticatedClientBuilder;

    fn throttle_response(retry_after: Option<&str>) -> Response {
        let mut builder = http::Response::builder().status(429);
        if let Some(value) = retry_after {
            builder = builder.header("retry-after", value);
        }
        Response::from(builder.body("").unwrap())
    }

    #[test]
    fn test_retry_after_hint_is_honored() {
        let response = throttle_response(Some("7"));
        assert_eq!(
            RetryAfterMiddleware::delay_for(&response, 0),
            Duration::from_secs(7)
        );
    }

    #[test]
    fn test_retry_after_hint_is_capped() {
        let response = throttle_response(Some("3600"));
        assert_eq!(RetryAfterMiddleware::delay_for(&response, 0), MAX_RETRY_AFTER);
    }

    #[test]
    fn test_missing_hint_falls_back_to_exponential() {
        let response = throttle_response(None);
        assert_eq!(
            RetryAfterMiddleware::delay_for(&response, 0),
            Duration::from_secs(1)
        );
        assert_eq!(
            RetryAfterMiddleware::delay_for(&response, 2),
            Duration::from_secs(4)
        );
    }

    #[tokio::test]
    async fn test_throttled_request_is_retried_until_budget_exhausted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/throttled")
            .with_status(429)
            .with_header("retry-after", "0")
            .with_body("{}")
            .expect(3)
            .create_async()
            .await;

        let client = AuthenticatedClientBuilder::new()
            .with_max_retries(2)
            .build()
            .unwrap();
        let response = client
            .get(format!("{}/throttled", server.url()))
            .send()
            .await
            .unwrap();

        // Initial attempt plus two retries, then the 429 surfaces
        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
