//! Scholia
//!
//! Anchors model-written margin notes to exact page text and keeps their
//! highlights in place while the page changes underneath them.
//!
//! # Modules
//!
//! - `dom`: Arena-backed document tree with stable node handles
//! - `anchor`: Maps a quoted passage to a concrete text range
//! - `layout`: Geometry oracle; `FlowLayout` for headless runs
//! - `highlight`: Highlight lifecycle, repositioning, and hover
//! - `annotations`: The margin-note record itself
//! - `extract`: Readable page content for prompting
//! - `llm`: Annotation providers and the streaming line parser
//! - `usage`: Token accounting with per-day history
//! - `session`: One page's annotation run, end to end

pub mod anchor;
pub mod annotations;
pub mod config;
pub mod dom;
pub mod extract;
pub mod geometry;
pub mod highlight;
pub mod layout;
pub mod llm;
pub mod session;
pub mod usage;

pub use annotations::{Annotation, AnnotationMode};
pub use geometry::{Point, Rect};
pub use session::{AnnotateOutcome, AnnotationSession, SessionError};
