//! Slash-menu command descriptors.
//!
//! Data only — rendering, keyboard navigation, and execution live in the
//! host. The controller merges a built-in set with caller additions and
//! hands the result to the document engine as extension config.

use serde::{Deserialize, Serialize};

/// One slash-menu entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashCommand {
    /// Menu label.
    pub title: String,
    /// One-line description shown under the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Extra search terms beyond the title.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl SlashCommand {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            keywords: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Case-insensitive filter match against title, keywords, and description.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.title.to_lowercase().contains(&q)
            || self.keywords.iter().any(|k| k.to_lowercase().contains(&q))
            || self
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&q))
    }
}

// ============================================================================
// Tests
// ============================================================================
