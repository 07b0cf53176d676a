//! Layout geometry
//!
//! The engine never computes page geometry itself; it asks a [`LayoutEngine`]
//! for the current rectangle decomposition of a text range and treats the
//! answer as true for this frame only. In a browser embedding the engine
//! would be backed by real client rects; [`FlowLayout`] is the deterministic
//! stand-in used by tests, benches, and the demo binary.

mod flow;

pub use flow::FlowLayout;

use crate::anchor::ResolvedRange;
use crate::dom::Document;
use crate::geometry::Rect;

/// Source of current on-page geometry for text ranges.
pub trait LayoutEngine {
    /// Disjoint line-fragment rectangles for `range`, in page coordinates,
    /// ordered top to bottom.
    ///
    /// Measured fresh on every call: results must never be cached across
    /// frames. An empty vector means the range is currently invisible
    /// (hidden subtree, collapsed text, or a stale range); that is a valid
    /// transient state, not a failure.
    fn rects_for_range(&self, doc: &Document, range: &ResolvedRange) -> Vec<Rect>;
}
