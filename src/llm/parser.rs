//! Streaming JSONL parser
//!
//! Providers emit annotations as one JSON object per line. Deltas arrive
//! with no relation to line boundaries, so this parser buffers text and
//! releases an annotation the moment its line is complete. Lines that are
//! not JSON objects (prose, partial output, markdown fences) are skipped.

use crate::annotations::{Annotation, AnnotationMode};

/// Accumulates streamed text and yields annotations per complete line
#[derive(Debug, Default)]
pub struct AnnotationLineParser {
    buffer: String,
}

impl AnnotationLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a streamed text delta. Returns the annotations completed by it.
    pub fn push(&mut self, delta: &str) -> Vec<Annotation> {
        self.buffer.push_str(delta);
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            if let Some(annotation) = parse_line(&line) {
                out.push(annotation);
            }
        }
        out
    }

    /// Flush the final line once the stream ends. Model output rarely ends
    /// with a newline, so the last annotation usually arrives here.
    pub fn finish(&mut self) -> Vec<Annotation> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest).into_iter().collect()
    }
}

fn parse_line(line: &str) -> Option<Annotation> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;

    let content = value["content"].as_str()?.trim();
    let anchor = value["anchor"].as_str()?;
    if content.is_empty() || anchor.is_empty() {
        return None;
    }
    // An unrecognized mode downgrades to no mode rather than losing the note.
    let mode = value
        .get("mode")
        .and_then(|m| serde_json::from_value::<AnnotationMode>(m.clone()).ok());

    Some(Annotation::new(mode, content, anchor))
}
