//! Types for session summaries and deliverable branding.

use serde::{Deserialize, Serialize};

/// Default primary brand color used when a coach has not configured one.
pub const DEFAULT_PRIMARY_COLOR: &str = "#2A3EB1";
/// Default secondary brand color used when a coach has not configured one.
pub const DEFAULT_SECONDARY_COLOR: &str = "#4C6FE7";

/// Structured summary of a coaching session produced by a summarization provider.
///
/// Every section defaults to empty so a structurally incomplete provider
/// response still parses; downstream rendering treats empty sections as
/// "nothing to show" rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl SessionSummary {
    /// True when the provider produced no usable content in any section.
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
            && self.goals.is_empty()
            && self.action_items.is_empty()
            && self.next_steps.is_empty()
    }
}

/// A single commitment extracted from the session.
///
/// Owner and due date are best-effort: summarization models frequently
/// identify the task but not who owns it or by when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Visual identity applied to rendered deliverables.
///
/// Colors are CSS color strings embedded directly in the generated
/// document's stylesheet. An absent logo renders a text-only header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandConfig {
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_secondary_color")]
    pub secondary_color: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            primary_color: default_primary_color(),
            secondary_color: default_secondary_color(),
            logo_url: None,
        }
    }
}

fn default_primary_color() -> String {
    DEFAULT_PRIMARY_COLOR.to_string()
}

fn default_secondary_color() -> String {
    DEFAULT_SECONDARY_COLOR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_parses_with_missing_sections() {
        let summary: SessionSummary =
            serde_json::from_str(r#"{"highlights": ["made progress"]}"#).unwrap();
        assert_eq!(summary.highlights, vec!["made progress".to_string()]);
        assert!(summary.goals.is_empty());
        assert!(summary.action_items.is_empty());
        assert!(summary.next_steps.is_empty());
    }

    #[test]
    fn summary_parses_from_empty_object() {
        let summary: SessionSummary = serde_json::from_str("{}").unwrap();
        assert!(summary.is_empty());
    }

    #[test]
    fn action_item_owner_and_due_date_optional() {
        let item: ActionItem = serde_json::from_str(r#"{"task": "book next session"}"#).unwrap();
        assert_eq!(item.task, "book next session");
        assert!(item.owner.is_none());
        assert!(item.due_date.is_none());
    }

    #[test]
    fn brand_config_defaults_fill_missing_fields() {
        let brand: BrandConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(brand.primary_color, DEFAULT_PRIMARY_COLOR);
        assert_eq!(brand.secondary_color, DEFAULT_SECONDARY_COLOR);
        assert!(brand.logo_url.is_none());
    }
}
