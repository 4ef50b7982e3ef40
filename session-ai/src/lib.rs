//! Session AI abstraction layer for transcription, summarization, and
//! deliverable rendering providers.
//!
//! This crate provides trait-based abstractions for the session deliverable
//! workflow:
//! - Speech-to-text transcription of recorded sessions
//! - LLM-powered structured summarization
//! - Rendering structured summaries into branded HTML deliverables
//!
//! The design is provider-agnostic, enabling applications to swap between
//! different service providers (OpenAI Whisper, Deepgram, Anthropic, etc.)
//! without changing application code.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::summary::{ActionItem, BrandConfig, SessionSummary};
