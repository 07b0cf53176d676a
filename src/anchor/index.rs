//! Concatenated text index
//!
//! Flattens the text a reader actually sees into one searchable string while
//! remembering which byte interval each text node contributed. Built fresh
//! for every resolution; the index never outlives the tree state it was
//! built from.

use crate::dom::{Document, NodeId, NON_RENDERED_TAGS};

use super::types::{RangeBoundary, TextSegment};

/// Searchable concatenation of the visible text under one root
#[derive(Debug, Clone)]
pub struct TextIndex {
    text: String,
    segments: Vec<TextSegment>,
}

impl TextIndex {
    /// Collect text leaves under `root` in document order.
    ///
    /// Skips nodes directly inside non-rendering elements and nodes that are
    /// whitespace-only. Kept text is concatenated byte for byte, whitespace
    /// intact.
    pub fn build(doc: &Document, root: NodeId) -> Self {
        let mut text = String::new();
        let mut segments = Vec::new();

        for id in doc.descendants(root) {
            let Some(content) = doc.text(id) else {
                continue;
            };
            if content.trim().is_empty() {
                continue;
            }
            if let Some(parent) = doc.parent(id) {
                if let Some(tag) = doc.tag(parent) {
                    if NON_RENDERED_TAGS.contains(&tag) {
                        continue;
                    }
                }
            }
            let start = text.len();
            text.push_str(content);
            segments.push(TextSegment {
                node: id,
                start,
                end: text.len(),
            });
        }

        Self { text, segments }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[TextSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Map a concatenation offset to a start boundary.
    ///
    /// A start offset sitting exactly on a segment seam belongs to the
    /// following segment, so the boundary always points at the first byte of
    /// matched text.
    pub fn start_boundary(&self, offset: usize) -> Option<RangeBoundary> {
        self.segments
            .iter()
            .find(|seg| seg.start <= offset && offset < seg.end)
            .map(|seg| RangeBoundary {
                node: seg.node,
                offset: offset - seg.start,
            })
    }

    /// Map a concatenation offset to an end boundary.
    ///
    /// An end offset on a seam belongs to the preceding segment, so the
    /// boundary closes just past the last byte of matched text.
    pub fn end_boundary(&self, offset: usize) -> Option<RangeBoundary> {
        self.segments
            .iter()
            .find(|seg| seg.start < offset && offset <= seg.end)
            .map(|seg| RangeBoundary {
                node: seg.node,
                offset: offset - seg.start,
            })
    }
}
