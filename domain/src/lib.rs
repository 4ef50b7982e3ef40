//! Domain operations for the Momentum backend.
//!
//! Sits between the HTTP layer (`web`) and the credential/provider
//! infrastructure (`session_auth`, `session_ai`): gateways to the Zoom and
//! OpenAI APIs, the Zoom connection lifecycle, recording discovery, the
//! deliverable pipeline, and deliverable persistence. `web` depends only
//! on this crate; lower-layer errors are translated at this boundary.

pub mod deliverable;
pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod recording;
pub mod rendering;
pub mod zoom_connection;

// AI provider types that cross the web boundary.
pub use session_ai::types::summary::{ActionItem, BrandConfig, SessionSummary};
