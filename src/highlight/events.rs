//! Manager change notifications

use serde::Serialize;

use crate::annotations::Annotation;

/// State changes observable from outside the manager.
///
/// Emitted synchronously after the manager's own state is consistent, so a
/// subscriber always observes the post-change world.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HighlightEvent {
    /// An annotation was anchored and its highlight is on the page
    #[serde(rename_all = "camelCase")]
    EntryAdded { annotation: Annotation },
    /// Global visibility toggled
    #[serde(rename_all = "camelCase")]
    VisibilityChanged { visible: bool },
    /// Every entry was discarded
    Cleared,
}
