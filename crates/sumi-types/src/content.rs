//! Document content snapshots.
//!
//! `Content` is the unit of persistence and hydration: either a plain string
//! or a structured document tree (JSON, in the nested node/`content`/`text`
//! shape rich-text engines emit). The controller never interprets tree
//! internals beyond flattening to plain text for prompt seeding.

use serde::{Deserialize, Serialize};

/// An opaque document snapshot.
///
/// Serializes untagged: `Text` as a bare JSON string, `Tree` as whatever the
/// document engine produced. Untagged deserialization tries `Text` first, so
/// a `Tree` wrapping a bare JSON string comes back as `Text` — equivalent for
/// every operation this crate defines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text.
    Text(String),
    /// Structured document tree (engine-defined JSON).
    Tree(serde_json::Value),
}

impl Content {
    /// The empty snapshot.
    pub fn empty() -> Self {
        Content::Text(String::new())
    }

    /// Whether this snapshot counts as "no content".
    ///
    /// An empty string and a JSON null are empty; any other tree is not,
    /// even `{}` — presence of a tree means the engine produced a document.
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Text(s) => s.is_empty(),
            Content::Tree(v) => v.is_null(),
        }
    }

    /// Flatten to plain text.
    ///
    /// Trees are walked in document order: every `text` field is collected,
    /// and top-level blocks (direct children of the root `content` array)
    /// are joined with blank lines.
    pub fn plain_text(&self) -> String {
        match self {
            Content::Text(s) => s.clone(),
            Content::Tree(v) => tree_text(v),
        }
    }

    /// Character count of the flattened text.
    pub fn char_len(&self) -> usize {
        match self {
            Content::Text(s) => s.chars().count(),
            Content::Tree(v) => tree_text(v).chars().count(),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Content::empty()
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Text(s.to_string())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Text(s)
    }
}

impl From<serde_json::Value> for Content {
    fn from(v: serde_json::Value) -> Self {
        Content::Tree(v)
    }
}

/// Flatten a document tree: top-level blocks joined with blank lines,
/// `text` leaves concatenated within a block.
fn tree_text(root: &serde_json::Value) -> String {
    match root.get("content").and_then(|c| c.as_array()) {
        Some(blocks) => {
            let parts: Vec<String> = blocks.iter().map(collect_text).collect();
            parts
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        None => collect_text(root),
    }
}

fn collect_text(node: &serde_json::Value) -> String {
    let mut out = String::new();
    if let Some(obj) = node.as_object() {
        if let Some(text) = obj.get("text").and_then(|t| t.as_str()) {
            out.push_str(text);
        }
        if let Some(children) = obj.get("content").and_then(|c| c.as_array()) {
            for child in children {
                out.push_str(&collect_text(child));
            }
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
