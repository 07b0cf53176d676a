//! Anchor resolution
//!
//! Maps a literal quote (the `anchor` of an [`Annotation`]) to a concrete
//! text range in the page, even when the quoted passage is split across
//! multiple text nodes or differs from the page only in whitespace.
//!
//! Resolution is two-pass. The exact pass searches the concatenated visible
//! text as-is. The normalized pass collapses whitespace runs on both sides
//! and walks the original text in lock step to map the hit back to real byte
//! offsets. Anything fuzzier than whitespace is out of scope: a quote that
//! differs in actual characters does not anchor.
//!
//! [`Annotation`]: crate::annotations::Annotation

mod index;
mod resolver;
mod types;

pub use index::TextIndex;
pub use resolver::resolve;
pub use types::{RangeBoundary, ResolveError, ResolvedRange, TextSegment};
