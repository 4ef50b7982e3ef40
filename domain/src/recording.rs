//! Recording discovery operations.
//!
//! Lists a user's cloud recordings through the Zoom gateway and shapes
//! them into transient descriptors for the frontend. Descriptors are
//! never persisted; their download URLs expire on the provider side
//! within a short window.

use crate::error::Error;
use crate::gateway::zoom::{MeetingRecording, RecordingFile, ZoomApiClient};
use crate::zoom_connection;
use log::*;
use secrecy::ExposeSecret;
use serde::Serialize;
use service::config::Config;
use session_auth::oauth::token::{Manager, Storage};
use utoipa::ToSchema;

pub use crate::gateway::zoom::ListRecordingsParams;

/// One downloadable file within a recording, as exposed to the frontend.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordingFileDescriptor {
    pub id: String,
    pub file_type: String,
    pub file_extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    pub recording_type: String,
}

/// A recorded meeting occurrence with its downloadable files.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordingDescriptor {
    pub meeting_id: String,
    pub uuid: String,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    pub files: Vec<RecordingFileDescriptor>,
}

/// One page of recording descriptors.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordingListing {
    pub recordings: Vec<RecordingDescriptor>,
    pub page_count: u32,
    pub page_number: u32,
    pub page_size: u32,
    pub total_records: u32,
}

impl From<&RecordingFile> for RecordingFileDescriptor {
    fn from(file: &RecordingFile) -> Self {
        Self {
            id: file.id.clone(),
            file_type: file.file_type.clone(),
            file_extension: file.file_extension.clone(),
            file_size: file.file_size,
            recording_type: file.recording_type.clone(),
        }
    }
}

impl From<&MeetingRecording> for RecordingDescriptor {
    fn from(meeting: &MeetingRecording) -> Self {
        Self {
            meeting_id: meeting
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| meeting.uuid.clone()),
            uuid: meeting.uuid.clone(),
            topic: meeting.topic.clone(),
            start_time: meeting.start_time.clone(),
            duration_minutes: meeting.duration,
            files: meeting.recording_files.iter().map(Into::into).collect(),
        }
    }
}

/// List the user's cloud recordings, one page at a time.
///
/// Ensures a fresh credential first, so an expired access token never
/// reaches the provider.
pub async fn list<S: Storage>(
    manager: &Manager<S>,
    config: &Config,
    zoom: &ZoomApiClient,
    user_id: &str,
    params: ListRecordingsParams,
) -> Result<RecordingListing, Error> {
    let credential = zoom_connection::ensure_fresh(manager, config, user_id).await?;

    let page = zoom
        .list_recordings(credential.access_token.expose_secret(), params)
        .await?;

    debug!(
        "Listed {} of {} recordings for user {} (page {}/{})",
        page.meetings.len(),
        page.total_records,
        user_id,
        page.page_number,
        page.page_count
    );

    Ok(RecordingListing {
        recordings: page.meetings.iter().map(Into::into).collect(),
        page_count: page.page_count,
        page_number: page.page_number,
        page_size: page.page_size,
        total_records: page.total_records,
    })
}

/// Locate one downloadable file within a meeting's recordings.
///
/// Returns the gateway-level file (with its download URL) for the
/// pipeline; the URL is never exposed through descriptors.
pub async fn find_file(
    zoom: &ZoomApiClient,
    access_token: &str,
    meeting_id: &str,
    file_id: &str,
) -> Result<RecordingFile, Error> {
    let meeting = zoom.get_meeting_recordings(access_token, meeting_id).await?;

    meeting
        .recording_files
        .iter()
        .find(|f| f.id == file_id)
        .cloned()
        .ok_or_else(|| Error {
            source: None,
            error_kind: crate::error::DomainErrorKind::External(
                crate::error::ExternalErrorKind::Api(crate::error::ApiErrorKind::NotFound),
            ),
        })
}
