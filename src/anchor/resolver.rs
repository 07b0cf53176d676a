//! Two-pass anchor matching

use crate::dom::{Document, NodeId};

use super::index::TextIndex;
use super::types::{ResolveError, ResolvedRange};

/// Resolve a literal quote to a text range under `root`.
///
/// The exact pass finds the leftmost occurrence of `anchor` in the
/// concatenated visible text. If that misses, the normalized pass collapses
/// whitespace runs on both sides and maps the hit back to original offsets.
/// The quote must otherwise be literal; no fuzzy matching.
///
/// The document is re-scanned on every call, so the result reflects the
/// tree as it is right now.
pub fn resolve(
    doc: &Document,
    root: NodeId,
    anchor: &str,
) -> Result<ResolvedRange, ResolveError> {
    if anchor.is_empty() {
        return Err(ResolveError::AnchorNotFound);
    }

    let index = TextIndex::build(doc, root);
    if index.is_empty() {
        return Err(ResolveError::AnchorNotFound);
    }

    let (start, end) = match index.text().find(anchor) {
        Some(at) => (at, at + anchor.len()),
        None => {
            tracing::debug!(anchor_len = anchor.len(), "exact match missed, trying normalized");
            normalized_match(index.text(), anchor).ok_or(ResolveError::AnchorNotFound)?
        }
    };

    let range = ResolvedRange {
        start: index.start_boundary(start).ok_or_else(|| {
            ResolveError::RangeConstructionFailed(format!(
                "start offset {start} outside collected segments"
            ))
        })?,
        end: index.end_boundary(end).ok_or_else(|| {
            ResolveError::RangeConstructionFailed(format!(
                "end offset {end} outside collected segments"
            ))
        })?,
    };

    if !range.is_valid(doc) {
        return Err(ResolveError::RangeConstructionFailed(
            "boundary node detached or offset out of bounds".to_string(),
        ));
    }

    Ok(range)
}

/// Collapse whitespace runs to single spaces and trim both ends.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find `needle` in `haystack` under whitespace normalization and map the
/// hit back to byte offsets in the original `haystack`.
///
/// The original is walked in lock step with its normalized form: each
/// non-whitespace char advances the normalized position by its own width,
/// each whitespace run between words advances it by one space. Because the
/// normalized needle is trimmed, both ends of a hit land on real characters.
fn normalized_match(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle_norm = normalize_whitespace(needle);
    if needle_norm.is_empty() {
        return None;
    }

    let haystack_norm = normalize_whitespace(haystack);
    let hit_start = haystack_norm.find(&needle_norm)?;
    let hit_end = hit_start + needle_norm.len();

    let mut norm_pos = 0usize;
    let mut emitted_any = false;
    let mut pending_space = false;
    let mut start = None;

    for (orig_pos, ch) in haystack.char_indices() {
        if ch.is_whitespace() {
            // leading whitespace never reaches the normalized form
            if emitted_any {
                pending_space = true;
            }
            continue;
        }
        if pending_space {
            norm_pos += 1;
            pending_space = false;
        }
        if start.is_none() && norm_pos == hit_start {
            start = Some(orig_pos);
        }
        norm_pos += ch.len_utf8();
        emitted_any = true;
        if norm_pos >= hit_end {
            return start.map(|s| (s, orig_pos + ch.len_utf8()));
        }
    }

    None
}
