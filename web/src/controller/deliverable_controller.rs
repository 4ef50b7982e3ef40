//! Controller for session deliverables.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::deliverable::GenerateParams;
use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use domain::deliverable::{Deliverable, DeliverableSummary};
use domain::pipeline::ProcessRequest;
use log::*;
use service::config::ApiVersion;
use uuid::Uuid;

/// POST /deliverables/generate
///
/// Generate a deliverable from a transcript the caller already has,
/// skipping the download and transcription stages.
#[utoipa::path(
    post,
    path = "/deliverables/generate",
    params(
        ApiVersion,
    ),
    request_body = GenerateParams,
    responses(
        (status = 201, description = "Deliverable created", body = domain::pipeline::PipelineOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Summarization failed"),
    ),
    security(
        ("user_id_header" = [])
    )
)]
pub async fn generate(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<GenerateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST generate deliverable from transcript for user {user_id}");

    let request = ProcessRequest {
        client_name: params.client_name,
        brand: params.brand,
    };

    let outcome = app_state
        .pipeline
        .generate_from_transcript(&user_id, &params.transcript, request)
        .await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), outcome)))
}

/// GET /deliverables
///
/// List the caller's deliverables, newest first, without HTML bodies.
#[utoipa::path(
    get,
    path = "/deliverables",
    params(
        ApiVersion,
    ),
    responses(
        (status = 200, description = "Successfully retrieved all deliverables", body = [DeliverableSummary]),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("user_id_header" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all deliverables for user {user_id}");

    let deliverables = app_state.deliverables.list_by_user(&user_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), deliverables)))
}

/// GET /deliverables/{id}
///
/// Fetch one deliverable, HTML included. Only the owner may read it.
#[utoipa::path(
    get,
    path = "/deliverables/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Deliverable ID"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved a deliverable", body = Deliverable),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Deliverable belongs to another user"),
        (status = 404, description = "Deliverable not found"),
    ),
    security(
        ("user_id_header" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET deliverable by id: {id}");

    let deliverable = app_state.deliverables.get_by_id(id, &user_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), deliverable)))
}
