//! Zoom connection lifecycle operations.
//!
//! Connecting a Zoom account, exchanging the OAuth callback code,
//! reporting connection status, and disconnecting. Token refresh and
//! per-user locking are delegated to the session-auth `Manager`.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::gateway::oauth::{self, Credential, Provider, ProviderKind};
use chrono::{DateTime, Utc};
use log::*;
use secrecy::ExposeSecret;
use serde::Serialize;
use service::config::Config;
use session_auth::oauth::providers::zoom::Provider as ZoomProvider;
use session_auth::oauth::token::{Manager, Storage};
use utoipa::ToSchema;

/// Connection state reported to the frontend.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Build the Zoom OAuth authorization URL for a user.
///
/// The OAuth `state` parameter carries the user id so the callback can
/// attribute the code without server-side session state.
pub fn authorize_url(config: &Config, user_id: &str) -> Result<String, Error> {
    let provider = create_zoom_provider(config)?;
    let auth_request = provider.authorization_url(user_id, None);

    info!("Redirecting user {} to Zoom OAuth", user_id);
    Ok(auth_request.url)
}

/// Exchange an authorization code for tokens and store the credential.
///
/// Returns the success redirect URL for the frontend.
pub async fn exchange_and_store<S: Storage>(
    manager: &Manager<S>,
    config: &Config,
    user_id: &str,
    authorization_code: &str,
) -> Result<String, Error> {
    info!("Processing Zoom OAuth callback for user {}", user_id);

    let provider = create_zoom_provider(config)?;

    let tokens = provider
        .exchange_code(authorization_code, None)
        .await
        .inspect_err(|e| {
            warn!(
                "Failed to exchange OAuth code for user {}: {:?}",
                user_id, e
            )
        })?;

    let access_token = tokens.access_token.clone();
    let credential = Credential::from_tokens(user_id, tokens)?;

    // Capture the Zoom-side account identity on the credential
    let credential = match provider.get_user_info(access_token.expose_secret()).await {
        Ok(user_info) => credential.with_account(user_info.id, user_info.email),
        Err(e) => {
            warn!("Failed to get Zoom user info for user {}: {:?}", user_id, e);
            credential
        }
    };

    manager
        .store(ProviderKind::Zoom.as_str(), credential)
        .await?;

    info!("Successfully stored Zoom OAuth tokens for user {}", user_id);

    let base_url = config.frontend_base_url().ok_or_else(|| Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    })?;
    Ok(format!("{}?zoom=connected", base_url))
}

/// Report whether the user has a Zoom credential and its expiry.
///
/// A stored-but-expired credential still reports connected: the next API
/// call will refresh it transparently.
pub async fn connection_status<S: Storage>(
    manager: &Manager<S>,
    user_id: &str,
) -> Result<ConnectionStatus, Error> {
    let credential = manager.get(user_id, ProviderKind::Zoom.as_str()).await?;

    Ok(match credential {
        Some(credential) => ConnectionStatus {
            connected: true,
            provider_email: credential.provider_email.clone(),
            expires_at: Some(credential.expires_at),
        },
        None => ConnectionStatus {
            connected: false,
            provider_email: None,
            expires_at: None,
        },
    })
}

/// Delete the stored Zoom credential for a user.
pub async fn disconnect<S: Storage>(manager: &Manager<S>, user_id: &str) -> Result<(), Error> {
    manager.delete(user_id, ProviderKind::Zoom.as_str()).await?;
    info!("Deleted Zoom credential for user {}", user_id);
    Ok(())
}

/// Get a credential guaranteed fresh beyond the expiry margin.
///
/// Refreshes (with per-user locking) when needed. A revoked refresh
/// token deletes the stored credential and surfaces `AuthExpired` so the
/// caller can prompt re-authorization.
pub async fn ensure_fresh<S: Storage>(
    manager: &Manager<S>,
    config: &Config,
    user_id: &str,
) -> Result<Credential, Error> {
    let provider = create_zoom_provider(config)?;

    let credential = manager
        .ensure_fresh(&provider, user_id)
        .await
        .inspect_err(|e| warn!("Failed to get fresh credential for user {}: {:?}", user_id, e))?;

    Ok(credential)
}

/// Create a Zoom OAuth provider from config.
fn create_zoom_provider(config: &Config) -> Result<ZoomProvider, Error> {
    let client_id = config.zoom_client_id().ok_or_else(|| Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    })?;

    let client_secret = config.zoom_client_secret().ok_or_else(|| Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    })?;

    let redirect_uri = config.zoom_redirect_url().ok_or_else(|| Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    })?;

    Ok(crate::gateway::oauth::zoom::new_provider(
        client_id,
        client_secret,
        redirect_uri,
        config.zoom_oauth_base_url(),
        config.zoom_api_base_url(),
    ))
}
