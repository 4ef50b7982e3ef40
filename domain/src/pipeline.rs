//! Recording-to-deliverable processing pipeline.
//!
//! A per-invocation state machine: Downloading -> Transcribing ->
//! Summarizing -> Persisting -> Done, with a terminal failure from any
//! stage. Failures carry the stage they occurred in; nothing is persisted
//! unless the Persisting stage completes. Stages are never retried within
//! an invocation. Re-running the whole pipeline is safe and deliberately
//! non-idempotent: each successful run creates a distinct deliverable.

use crate::deliverable::{Deliverable, DeliverableStore};
use crate::error::{Error, PipelineStage};
use crate::gateway::zoom::ZoomApiClient;
use crate::recording;
use crate::zoom_connection;
use futures::StreamExt;
use log::*;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service::config::Config;
use session_ai::traits::rendering::Renderer;
use session_ai::traits::{summarization, transcription};
use session_ai::types::summary::BrandConfig;
use session_auth::oauth::token::{Manager, Storage};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Caller-supplied parameters for a pipeline run.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProcessRequest {
    /// Client or session name used in the deliverable header.
    pub client_name: String,
    /// Brand overrides; defaults apply for anything omitted.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub brand: BrandConfig,
}

/// Successful pipeline result.
#[derive(Debug, Serialize, ToSchema)]
pub struct PipelineOutcome {
    pub id: Uuid,
    pub html: String,
}

/// The deliverable pipeline with its injected collaborators.
pub struct DeliverablePipeline<S: Storage> {
    manager: Arc<Manager<S>>,
    zoom: Arc<ZoomApiClient>,
    transcription: Arc<dyn transcription::Provider>,
    summarization: Arc<dyn summarization::Provider>,
    renderer: Arc<dyn Renderer>,
    store: Arc<dyn DeliverableStore>,
}

impl<S: Storage> DeliverablePipeline<S> {
    pub fn new(
        manager: Arc<Manager<S>>,
        zoom: Arc<ZoomApiClient>,
        transcription: Arc<dyn transcription::Provider>,
        summarization: Arc<dyn summarization::Provider>,
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn DeliverableStore>,
    ) -> Self {
        Self {
            manager,
            zoom,
            transcription,
            summarization,
            renderer,
            store,
        }
    }

    /// Run the full pipeline for one recording file.
    pub async fn process_recording(
        &self,
        config: &Config,
        user_id: &str,
        meeting_id: &str,
        file_id: &str,
        request: ProcessRequest,
    ) -> Result<PipelineOutcome, Error> {
        info!(
            "Pipeline start for user {} meeting {} file {}",
            user_id, meeting_id, file_id
        );

        // Downloading
        let (audio, mime_type) = self
            .download(config, user_id, meeting_id, file_id)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Downloading))?;

        // Transcribing: the collected bytes are moved into the provider
        // and dropped with the stage, success or failure
        let transcript = self
            .transcription
            .transcribe(audio, &mime_type)
            .await
            .map_err(|e| Error::from(e).at_stage(PipelineStage::Transcribing))?;

        self.summarize_and_persist(user_id, &transcript, request)
            .await
    }

    /// Run the tail of the pipeline on a transcript the caller already has.
    pub async fn generate_from_transcript(
        &self,
        user_id: &str,
        transcript: &str,
        request: ProcessRequest,
    ) -> Result<PipelineOutcome, Error> {
        self.summarize_and_persist(user_id, transcript, request)
            .await
    }

    async fn download(
        &self,
        config: &Config,
        user_id: &str,
        meeting_id: &str,
        file_id: &str,
    ) -> Result<(Vec<u8>, String), Error> {
        let credential = zoom_connection::ensure_fresh(&self.manager, config, user_id).await?;
        let access_token = credential.access_token.expose_secret();

        let file = recording::find_file(&self.zoom, access_token, meeting_id, file_id).await?;
        let mime_type = mime_for_file(&file.file_type, &file.file_extension);

        let mut stream = self
            .zoom
            .download_recording_file(access_token, &file.download_url)
            .await?;

        let mut audio = Vec::new();
        while let Some(chunk) = stream.next().await {
            audio.extend_from_slice(&chunk?);
        }

        debug!(
            "Downloaded {} bytes ({}) for meeting {}",
            audio.len(),
            mime_type,
            meeting_id
        );

        Ok((audio, mime_type))
    }

    async fn summarize_and_persist(
        &self,
        user_id: &str,
        transcript: &str,
        request: ProcessRequest,
    ) -> Result<PipelineOutcome, Error> {
        // Summarizing: structurally incomplete summaries come back with
        // empty sections and proceed; only hard provider failures stop here
        let summary = self
            .summarization
            .summarize(transcript)
            .await
            .map_err(|e| Error::from(e).at_stage(PipelineStage::Summarizing))?;

        // Persisting
        let html = self
            .renderer
            .render(&request.client_name, &summary, &request.brand)
            .map_err(|e| Error::from(e).at_stage(PipelineStage::Persisting))?;

        let deliverable = Deliverable::new(user_id, &request.client_name, html.clone());
        let id = self
            .store
            .create(deliverable)
            .await
            .map_err(|e| e.at_stage(PipelineStage::Persisting))?;

        info!("Pipeline created deliverable {} for user {}", id, user_id);

        Ok(PipelineOutcome { id, html })
    }
}

/// Map a Zoom recording file type onto the upload media type.
fn mime_for_file(file_type: &str, file_extension: &str) -> String {
    let kind = if file_type.is_empty() {
        file_extension
    } else {
        file_type
    };
    match kind.to_ascii_uppercase().as_str() {
        "MP4" => "video/mp4",
        "MP3" => "audio/mpeg",
        "WAV" => "audio/wav",
        _ => "audio/m4a",
    }
    .to_string()
}
