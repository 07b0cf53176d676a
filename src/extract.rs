//! Page content extraction
//!
//! Produces the text bundle sent to the model. `content` reuses the exact
//! text enumeration anchor resolution uses, so a model that quotes from it
//! quotes bytes that exist on the page; anchoring failures are then down to
//! the model misquoting, not to two views of the same page disagreeing.

use serde::{Deserialize, Serialize};

use crate::anchor::TextIndex;
use crate::dom::Document;

const EXCERPT_CHARS: usize = 200;

/// Readable content of one page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub title: String,
    /// Visible body text, byte for byte the text anchors resolve against.
    pub content: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    pub url: String,
    /// Content length in bytes.
    pub length: usize,
}

/// Extract the readable content of a parsed page.
///
/// Returns `None` for pages with no visible body text; there is nothing to
/// annotate on such pages.
pub fn extract_page(doc: &Document, url: &str) -> Option<ExtractedContent> {
    let index = TextIndex::build(doc, doc.body());
    if index.is_empty() {
        return None;
    }

    let content = index.text().to_string();
    Some(ExtractedContent {
        title: page_title(doc),
        excerpt: make_excerpt(&content),
        byline: meta_value(doc, "name", "author"),
        site_name: meta_value(doc, "property", "og:site_name"),
        url: url.to_string(),
        length: content.len(),
        content,
    })
}

fn page_title(doc: &Document) -> String {
    for tag in ["title", "h1"] {
        let found = doc
            .descendants(doc.root())
            .find(|&id| doc.tag(id) == Some(tag));
        if let Some(element) = found {
            let text: String = doc
                .descendants(element)
                .filter_map(|id| doc.text(id))
                .collect();
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    String::new()
}

fn meta_value(doc: &Document, key_attr: &str, key: &str) -> Option<String> {
    doc.descendants(doc.root())
        .filter(|&id| doc.tag(id) == Some("meta"))
        .find(|&id| doc.attr(id, key_attr) == Some(key))
        .and_then(|id| doc.attr(id, "content"))
        .map(|value| value.to_string())
}

fn make_excerpt(content: &str) -> String {
    let normalized = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= EXCERPT_CHARS {
        normalized
    } else {
        normalized.chars().take(EXCERPT_CHARS).collect()
    }
}
