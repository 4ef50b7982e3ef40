//! Controller for the Zoom connection lifecycle.
//!
//! Handles the Zoom OAuth flow plus connection status and disconnect.
//!
//! Note: OAuth endpoints don't use CompareApiVersion because they work via
//! browser redirects which cannot set custom headers.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;

use domain::zoom_connection;
use log::*;
use serde::Deserialize;
use service::config::ApiVersion;

/// Query parameters for the OAuth callback
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: String,
    pub state: Option<String>,
}

/// Helper to create an invalid-input error
fn invalid_input_error() -> Error {
    Error(domain::error::Error {
        source: None,
        error_kind: domain::error::DomainErrorKind::Internal(
            domain::error::InternalErrorKind::Entity(domain::error::EntityErrorKind::Invalid),
        ),
    })
}

/// GET /oauth/zoom/authorize
///
/// Initiates the Zoom OAuth flow by redirecting to Zoom's authorization endpoint.
/// Note: This endpoint doesn't require x-version header as it's followed via browser redirect.
#[utoipa::path(
    get,
    path = "/oauth/zoom/authorize",
    responses(
        (status = 302, description = "Redirect to Zoom OAuth"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Server error (OAuth not configured)"),
    ),
    security(
        ("user_id_header" = [])
    )
)]
pub async fn authorize(
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let url = zoom_connection::authorize_url(&app_state.config, &user_id)?;
    Ok(Redirect::temporary(&url))
}

/// GET /oauth/zoom/callback
///
/// Handles the OAuth callback from Zoom after user consent.
/// Note: This endpoint doesn't require x-version header as it's called via Zoom's redirect.
#[utoipa::path(
    get,
    path = "/oauth/zoom/callback",
    params(
        ("code" = String, Query, description = "Authorization code from Zoom"),
        ("state" = Option<String>, Query, description = "State parameter (user ID)"),
    ),
    responses(
        (status = 302, description = "Redirect to the frontend on success"),
        (status = 422, description = "Invalid callback parameters"),
        (status = 502, description = "Token exchange failed"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Query(params): Query<OAuthCallback>,
) -> Result<impl IntoResponse, Error> {
    let user_id = params
        .state
        .as_deref()
        .map(str::trim)
        .filter(|state| !state.is_empty())
        .ok_or_else(|| {
            warn!("Zoom OAuth callback arrived without a state parameter");
            invalid_input_error()
        })?;

    let redirect_url = zoom_connection::exchange_and_store(
        app_state.manager.as_ref(),
        &app_state.config,
        user_id,
        &params.code,
    )
    .await?;

    Ok(Redirect::temporary(&redirect_url))
}

/// GET /zoom/status
///
/// Report whether the caller has a Zoom connection and when it expires.
#[utoipa::path(
    get,
    path = "/zoom/status",
    params(
        ApiVersion,
    ),
    responses(
        (status = 200, description = "Connection status retrieved", body = zoom_connection::ConnectionStatus),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("user_id_header" = [])
    )
)]
pub async fn status(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Zoom connection status for user: {user_id}");

    let status = zoom_connection::connection_status(app_state.manager.as_ref(), &user_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), status)))
}

/// DELETE /zoom/connection
///
/// Delete the caller's stored Zoom credential.
#[utoipa::path(
    delete,
    path = "/zoom/connection",
    params(
        ApiVersion,
    ),
    responses(
        (status = 200, description = "Zoom connection removed"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("user_id_header" = [])
    )
)]
pub async fn disconnect(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Zoom connection for user: {user_id}");

    zoom_connection::disconnect(app_state.manager.as_ref(), &user_id).await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}
