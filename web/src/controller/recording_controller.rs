//! Controller for cloud recording discovery and processing.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::recording::IndexParams;
use crate::{AppState, Error};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use domain::pipeline::ProcessRequest;
use domain::recording;
use log::*;
use service::config::ApiVersion;

/// GET /zoom/recordings
///
/// List the caller's cloud recordings, one page at a time.
#[utoipa::path(
    get,
    path = "/zoom/recordings",
    params(
        ApiVersion,
        IndexParams,
    ),
    responses(
        (status = 200, description = "Successfully retrieved a page of recordings", body = recording::RecordingListing),
        (status = 401, description = "Unauthorized or Zoom connection expired"),
        (status = 429, description = "Zoom throttled the request even after backoff"),
    ),
    security(
        ("user_id_header" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET recordings for user {user_id}: {params:?}");

    let listing = recording::list(
        app_state.manager.as_ref(),
        &app_state.config,
        app_state.zoom.as_ref(),
        &user_id,
        params.into(),
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), listing)))
}

/// POST /zoom/recordings/{meeting_id}/files/{file_id}/process
///
/// Run the full download, transcribe, summarize, persist pipeline for one
/// recording file and return the created deliverable.
#[utoipa::path(
    post,
    path = "/zoom/recordings/{meeting_id}/files/{file_id}/process",
    params(
        ApiVersion,
        ("meeting_id" = String, Path, description = "Zoom meeting ID or UUID"),
        ("file_id" = String, Path, description = "Recording file ID within the meeting"),
    ),
    request_body = ProcessRequest,
    responses(
        (status = 201, description = "Deliverable created", body = domain::pipeline::PipelineOutcome),
        (status = 401, description = "Unauthorized or Zoom connection expired"),
        (status = 404, description = "Meeting or file not found (or the download locator expired)"),
        (status = 502, description = "A provider failed mid-pipeline"),
    ),
    security(
        ("user_id_header" = [])
    )
)]
pub async fn process(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path((meeting_id, file_id)): Path<(String, String)>,
    Json(request): Json<ProcessRequest>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST process recording file {file_id} of meeting {meeting_id} for user {user_id}");

    let outcome = app_state
        .pipeline
        .process_recording(&app_state.config, &user_id, &meeting_id, &file_id, request)
        .await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), outcome)))
}
