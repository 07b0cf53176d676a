//! Anchor resolution types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dom::{Document, NodeId};

/// Resolution errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The anchor text does not occur in the searched content. An expected
    /// outcome for model-generated quotes, not a fault.
    #[error("Anchor text not found in page content")]
    AnchorNotFound,

    /// Matched offsets could not be mapped back onto live nodes.
    #[error("Range construction failed: {0}")]
    RangeConstructionFailed(String),
}

/// Byte interval a text node contributes to the concatenated page text.
///
/// Transient: valid only against the [`TextIndex`] that produced it.
///
/// [`TextIndex`]: super::TextIndex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment {
    pub node: NodeId,
    /// Interval `[start, end)` in the concatenated text, in bytes.
    pub start: usize,
    pub end: usize,
}

/// One end of a resolved range: a text node and a byte offset into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBoundary {
    pub node: NodeId,
    pub offset: usize,
}

/// A concrete text range in the live document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: RangeBoundary,
    pub end: RangeBoundary,
}

impl ResolvedRange {
    /// Whether the range still points at attached text with in-bounds
    /// offsets. A range goes stale when the host detaches either boundary
    /// node; it is never repaired in place, only re-resolved.
    pub fn is_valid(&self, doc: &Document) -> bool {
        for boundary in [&self.start, &self.end] {
            if !doc.is_attached(boundary.node) {
                return false;
            }
            match doc.text(boundary.node) {
                Some(text) if boundary.offset <= text.len() => {}
                _ => return false,
            }
        }
        true
    }
}
