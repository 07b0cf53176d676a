//! Deterministic flow layout
//!
//! A monospace line-wrapping model: every glyph is `char_width` wide, every
//! line is `line_height` tall, block elements start on fresh lines, and
//! whitespace collapses the way inline flow collapses it. Deliberately
//! simpler than a browser (no margins, no font metrics, wrap decisions are
//! made per text run) but it reflows under width changes and hides `hidden`
//! subtrees, which is the behavior the highlight layer has to survive.

use std::collections::HashMap;

use crate::anchor::ResolvedRange;
use crate::dom::{Document, NodeId, NON_RENDERED_TAGS};
use crate::geometry::Rect;

use super::LayoutEngine;

/// Elements laid out as blocks: they start and end a line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section",
    "table", "td", "th", "tr", "ul",
];

/// Reference [`LayoutEngine`] with monospace metrics
#[derive(Debug, Clone)]
pub struct FlowLayout {
    /// Available line width in CSS pixels.
    pub width: f32,
    pub char_width: f32,
    pub line_height: f32,
}

impl FlowLayout {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            char_width: 8.0,
            line_height: 16.0,
        }
    }

    fn measure(&self, doc: &Document) -> HashMap<NodeId, Vec<CharBox>> {
        let mut flow = Flow {
            layout: self,
            x: 0.0,
            line: 0,
            at_line_start: true,
            last_was_space: false,
            boxes: HashMap::new(),
        };
        flow.walk(doc, doc.root());
        flow.boxes
    }

    fn line_rect(&self, line: usize, min_x: f32, max_right: f32) -> Rect {
        Rect::new(
            min_x,
            line as f32 * self.line_height,
            max_right - min_x,
            self.line_height,
        )
    }
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self::new(800.0)
    }
}

impl LayoutEngine for FlowLayout {
    fn rects_for_range(&self, doc: &Document, range: &ResolvedRange) -> Vec<Rect> {
        if !range.is_valid(doc) {
            return Vec::new();
        }

        let boxes = self.measure(doc);
        let empty = Vec::new();
        let same_node = range.start.node == range.end.node;

        let mut selected: Vec<CharBox> = Vec::new();
        let mut in_range = false;
        for id in doc.descendants(doc.root()) {
            if !doc.is_text(id) {
                continue;
            }
            let node_boxes = boxes.get(&id).unwrap_or(&empty);
            if same_node {
                if id == range.start.node {
                    selected.extend(node_boxes.iter().filter(|cb| {
                        cb.byte >= range.start.offset && cb.byte < range.end.offset
                    }));
                    break;
                }
            } else if id == range.start.node {
                in_range = true;
                selected
                    .extend(node_boxes.iter().filter(|cb| cb.byte >= range.start.offset));
            } else if id == range.end.node {
                selected.extend(node_boxes.iter().filter(|cb| cb.byte < range.end.offset));
                break;
            } else if in_range {
                selected.extend(node_boxes.iter());
            }
        }

        // one rect per line, spanning the flowed extent on that line
        let mut rects: Vec<Rect> = Vec::new();
        let mut current: Option<(usize, f32, f32)> = None;
        for cb in &selected {
            if cb.width <= 0.0 {
                continue;
            }
            current = Some(match current {
                Some((line, min_x, max_r)) if line == cb.line => {
                    (line, min_x.min(cb.x), max_r.max(cb.x + cb.width))
                }
                Some((line, min_x, max_r)) => {
                    rects.push(self.line_rect(line, min_x, max_r));
                    (cb.line, cb.x, cb.x + cb.width)
                }
                None => (cb.line, cb.x, cb.x + cb.width),
            });
        }
        if let Some((line, min_x, max_r)) = current {
            rects.push(self.line_rect(line, min_x, max_r));
        }
        rects
    }
}

/// One glyph box, addressed by byte offset within its node's text
#[derive(Debug, Clone, Copy)]
struct CharBox {
    byte: usize,
    line: usize,
    x: f32,
    width: f32,
}

struct Flow<'a> {
    layout: &'a FlowLayout,
    x: f32,
    line: usize,
    at_line_start: bool,
    last_was_space: bool,
    boxes: HashMap<NodeId, Vec<CharBox>>,
}

impl Flow<'_> {
    fn break_line(&mut self) {
        if self.at_line_start {
            return;
        }
        self.line += 1;
        self.x = 0.0;
        self.at_line_start = true;
        self.last_was_space = false;
    }

    fn force_break(&mut self) {
        self.line += 1;
        self.x = 0.0;
        self.at_line_start = true;
        self.last_was_space = false;
    }

    fn walk(&mut self, doc: &Document, id: NodeId) {
        if let Some(tag) = doc.tag(id) {
            if NON_RENDERED_TAGS.contains(&tag) || doc.attr(id, "hidden").is_some() {
                return;
            }
            if tag == "br" {
                self.force_break();
                return;
            }
            let block = BLOCK_TAGS.contains(&tag);
            if block {
                self.break_line();
            }
            for &child in doc.children(id) {
                self.walk(doc, child);
            }
            if block {
                self.break_line();
            }
        } else if let Some(text) = doc.text(id) {
            self.flow_text(id, text);
        }
    }

    fn flow_text(&mut self, id: NodeId, text: &str) {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut out = Vec::with_capacity(chars.len());
        let mut i = 0;
        while i < chars.len() {
            let (byte, ch) = chars[i];
            if ch.is_whitespace() {
                // collapsed: only the first space between words has width,
                // and spaces never trigger a wrap themselves
                let width = if self.at_line_start || self.last_was_space {
                    0.0
                } else {
                    self.layout.char_width
                };
                out.push(CharBox {
                    byte,
                    line: self.line,
                    x: self.x,
                    width,
                });
                self.x += width;
                if width > 0.0 {
                    self.last_was_space = true;
                }
                i += 1;
                continue;
            }

            // greedy wrap on the word run within this text node
            let mut word_end = i;
            let mut word_width = 0.0;
            while word_end < chars.len() && !chars[word_end].1.is_whitespace() {
                word_width += self.layout.char_width;
                word_end += 1;
            }
            if !self.at_line_start && self.x + word_width > self.layout.width {
                self.break_line();
            }
            while i < word_end {
                if !self.at_line_start && self.x + self.layout.char_width > self.layout.width {
                    self.break_line();
                }
                out.push(CharBox {
                    byte: chars[i].0,
                    line: self.line,
                    x: self.x,
                    width: self.layout.char_width,
                });
                self.x += self.layout.char_width;
                self.at_line_start = false;
                self.last_was_space = false;
                i += 1;
            }
        }
        self.boxes.insert(id, out);
    }
}
