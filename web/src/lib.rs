//! HTTP layer for the Momentum backend.
//!
//! Exposes the Zoom connection lifecycle, recording discovery, the
//! deliverable pipeline, and deliverable retrieval as a JSON API. All
//! business logic lives in `domain`; this crate translates HTTP in and
//! out of it.

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use log::*;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use domain::deliverable::{DeliverableStore, MemoryDeliverableStore};
use domain::gateway::oauth::{
    EncryptedMemoryStorage, Manager, RateLimiter, RateLimiterConfig,
};
use domain::gateway::openai::OpenAiClient;
use domain::gateway::zoom::ZoomApiClient;
use domain::pipeline::DeliverablePipeline;
use domain::rendering::HtmlRenderer;

mod controller;
mod error;
mod extractors;
mod params;
mod router;

pub use error::{Error, Result};

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub manager: Arc<Manager<EncryptedMemoryStorage>>,
    pub zoom: Arc<ZoomApiClient>,
    pub pipeline: Arc<DeliverablePipeline<EncryptedMemoryStorage>>,
    pub deliverables: Arc<dyn DeliverableStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Assemble the credential manager, gateways, pipeline, and stores
    /// from application configuration.
    pub fn new(config: Config) -> Result<Self> {
        let encryption_key = config.token_encryption_key().ok_or_else(|| {
            error!("TOKEN_ENCRYPTION_KEY is not configured");
            config_error()
        })?;
        let manager = Arc::new(Manager::new(EncryptedMemoryStorage::new(encryption_key)));

        let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
            base_spacing: Duration::from_millis(config.rate_limit_base_spacing_ms),
            max_spacing: Duration::from_millis(config.rate_limit_max_spacing_ms),
            quiet_period: Duration::from_secs(config.rate_limit_quiet_period_secs),
        }));
        let zoom = Arc::new(ZoomApiClient::new(config.zoom_api_base_url(), rate_limiter)?);

        let openai = Arc::new(OpenAiClient::from_config(&config)?);
        let deliverables: Arc<dyn DeliverableStore> = Arc::new(MemoryDeliverableStore::new());

        let pipeline = Arc::new(DeliverablePipeline::new(
            manager.clone(),
            zoom.clone(),
            openai.clone(),
            openai,
            Arc::new(HtmlRenderer),
            deliverables.clone(),
        ));

        Ok(Self {
            config,
            manager,
            zoom,
            pipeline,
            deliverables,
        })
    }
}

/// Bind the configured interface and serve the API until shutdown.
pub async fn init_server(config: Config) -> Result<()> {
    let host = config.interface.clone().unwrap_or_else(|| "127.0.0.1".to_string());
    let port = config.port;
    let server_url = format!("{host}:{port}");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static("x-version"),
            HeaderName::from_static("x-user-id"),
        ])
        .allow_origin(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        );

    let app_state = AppState::new(config)?;
    let router = router::define_routes(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&server_url)
        .await
        .map_err(|e| server_error(e, format!("Failed to bind {server_url}")))?;

    info!("Server starting... listening on {server_url}");

    axum::serve(listener, router)
        .await
        .map_err(|e| server_error(e, "Server exited with an error".to_string()))
}

fn config_error() -> Error {
    Error(domain::error::Error {
        source: None,
        error_kind: domain::error::DomainErrorKind::Internal(
            domain::error::InternalErrorKind::Config,
        ),
    })
}

fn server_error(source: std::io::Error, message: String) -> Error {
    Error(domain::error::Error {
        source: Some(Box::new(source)),
        error_kind: domain::error::DomainErrorKind::Internal(
            domain::error::InternalErrorKind::Other(message),
        ),
    })
}
