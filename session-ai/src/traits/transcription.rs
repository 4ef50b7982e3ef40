//! Transcription provider trait.

use crate::Error;
use async_trait::async_trait;

/// Abstraction for speech-to-text transcription services.
///
/// Implementations accept raw audio bytes and return a plain-text transcript.
/// Supports Whisper-style synchronous APIs; this trait enables provider
/// swapping for cost optimization without changing pipeline code.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Transcribe the given audio to plain text.
    ///
    /// `mime_type` tells the provider how to decode the payload (e.g.
    /// "audio/m4a", "video/mp4"). Fails with [`Error::Provider`] when the
    /// service rejects the media format or size.
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
    ) -> std::result::Result<String, Error>;

    /// Return unique identifier for this provider (e.g., "openai_whisper").
    ///
    /// Used for cost tracking and provider selection.
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;
}
