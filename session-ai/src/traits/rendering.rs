//! Deliverable rendering trait.

use crate::types::summary::{BrandConfig, SessionSummary};
use crate::Error;

/// Abstraction for turning a summary into a client-facing document.
///
/// Rendering is pure and synchronous: implementations produce a complete,
/// self-contained document string (HTML today) from the summary and the
/// coach's brand configuration. Empty summary sections are omitted from
/// the output rather than rendered as empty headings.
pub trait Renderer: Send + Sync {
    /// Render a branded deliverable for the named client.
    ///
    /// All user-controlled text must be escaped for the target format.
    fn render(
        &self,
        client_name: &str,
        summary: &SessionSummary,
        brand: &BrandConfig,
    ) -> std::result::Result<String, Error>;
}
