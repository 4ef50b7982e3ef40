//! Provider trait definitions.

pub mod rendering;
pub mod summarization;
pub mod transcription;
