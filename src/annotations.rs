//! Annotation records
//!
//! An annotation is a model-authored margin note tied to a passage of the
//! page by its `anchor`: the exact text the note is about, quoted verbatim.
//! The anchor is the only link between note and page; there are no stored
//! positions to go stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A margin note anchored to quoted page text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Unique identifier (UUID)
    pub id: String,
    /// Commentary style this note was generated under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AnnotationMode>,
    /// The note text shown to the reader
    pub content: String,
    /// Exact quote from the page the note refers to
    pub anchor: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
}

/// Commentary styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationMode {
    /// Close attention to language and structure
    CloseReading,
    /// Background and connections a curious reader would want
    Context,
    /// Counterarguments and weak points
    DevilsAdvocate,
}

impl AnnotationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CloseReading => "close-reading",
            Self::Context => "context",
            Self::DevilsAdvocate => "devils-advocate",
        }
    }

    /// Human-readable name for prompts and display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CloseReading => "Close Reading",
            Self::Context => "Context",
            Self::DevilsAdvocate => "Devil's Advocate",
        }
    }
}

impl Annotation {
    /// Create a new annotation with a fresh id and the current time.
    pub fn new(mode: Option<AnnotationMode>, content: &str, anchor: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            mode,
            content: content.to_string(),
            anchor: anchor.to_string(),
            timestamp: Utc::now(),
        }
    }
}
