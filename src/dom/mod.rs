//! Page document model
//!
//! The engine never touches a live browser page; it works against this arena
//! snapshot that the host keeps current. Elements and text runs live in a
//! flat `Vec`, addressed by [`NodeId`]. The host mutates the tree between
//! frames (text edits, subtree removals) and anchors re-check attachment
//! instead of assuming the tree stayed put.
//!
//! # Usage
//!
//! ```ignore
//! use crate::dom::Document;
//!
//! let doc = Document::parse("<body><p>Hello <em>world</em></p></body>")?;
//! let body = doc.body();
//! for id in doc.descendants(body) {
//!     if let Some(text) = doc.text(id) {
//!         println!("{text}");
//!     }
//! }
//! ```

mod node;
mod parser;

pub use node::{Descendants, Document, NodeData, NodeId};
pub use parser::DomError;

/// Elements whose text is never rendered (UA defaults).
pub(crate) const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template"];
