//! Lenient page-markup parser
//!
//! Builds a [`Document`] from an XHTML-ish snapshot of a page. Page
//! serializations are messier than strict XML, so the reader is forgiving:
//! mismatched or orphan end tags are skipped, void elements (`<br>`,
//! `<img>`, ...) close themselves, and entities are decoded with the HTML
//! table rather than the XML one so `&nbsp;` and friends survive.
//!
//! Whitespace in text is preserved exactly as written. The anchoring layer
//! depends on that: it matches against original bytes first and only
//! normalizes as a fallback.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::node::{Document, NodeId};

/// Markup parsing errors
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Malformed markup at byte {0}: {1}")]
    Malformed(usize, String),
}

/// Elements that never take children in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "source", "track", "wbr",
];

pub(crate) fn parse_document(markup: &str) -> Result<Document, DomError> {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);

    let mut doc = Document::new();
    let mut open: Vec<(String, NodeId)> = Vec::new();

    loop {
        let parent = open.last().map(|(_, id)| *id).unwrap_or(doc.root());
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (tag, attrs) = element_parts(&e);
                let id = doc.append_element_with_attrs(parent, &tag, attrs);
                if !VOID_ELEMENTS.contains(&tag.as_str()) {
                    open.push((tag, id));
                }
            }
            Ok(Event::Empty(e)) => {
                let (tag, attrs) = element_parts(&e);
                doc.append_element_with_attrs(parent, &tag, attrs);
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                // close up to the nearest matching open tag; orphan end tags
                // are dropped
                if let Some(at) = open.iter().rposition(|(open_tag, _)| *open_tag == tag) {
                    open.truncate(at);
                }
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(&e.into_inner()).into_owned();
                let text = html_escape::decode_html_entities(&raw).into_owned();
                if !text.is_empty() {
                    doc.append_text(parent, &text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                if !text.is_empty() {
                    doc.append_text(parent, &text);
                }
            }
            Ok(Event::Eof) => break,
            // declarations, doctypes, comments, processing instructions
            Ok(_) => {}
            Err(err) => {
                return Err(DomError::Malformed(reader.buffer_position(), err.to_string()))
            }
        }
    }

    Ok(doc)
}

fn element_parts(e: &BytesStart<'_>) -> (String, Vec<(String, String)>) {
    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
    let mut attrs = Vec::new();
    for attr in e.html_attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_lowercase();
        let value =
            html_escape::decode_html_entities(&String::from_utf8_lossy(&attr.value)).into_owned();
        attrs.push((key, value));
    }
    (tag, attrs)
}
