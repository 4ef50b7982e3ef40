//! Summarization provider trait.

use crate::types::summary::SessionSummary;
use crate::Error;
use async_trait::async_trait;

/// Abstraction for LLM-powered session summarization.
///
/// Implementations turn a raw transcript into a [`SessionSummary`] with
/// highlights, goals, action items, and next steps. A provider must return
/// a structurally valid summary even when the transcript is thin; missing
/// sections come back empty rather than failing the call.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Summarize a session transcript into structured sections.
    ///
    /// Fails with [`Error::Deserialization`] when the model output cannot
    /// be parsed into the summary shape after normalization.
    async fn summarize(&self, transcript: &str) -> std::result::Result<SessionSummary, Error>;

    /// Return unique identifier for this provider (e.g., "openai_chat").
    fn provider_id(&self) -> &str;
}
