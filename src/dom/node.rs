//! Arena document tree
//!
//! Ids are stable for the lifetime of the document: removing a subtree
//! detaches it but never invalidates or reuses ids, so a stale handle can
//! still be asked whether it is attached.

use serde::{Deserialize, Serialize};

use super::parser::{self, DomError};

/// Handle to a node in a [`Document`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

/// Node payload: an element with tag and attributes, or a text run
#[derive(Debug, Clone)]
pub enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create an empty document containing only the synthetic root.
    pub fn new() -> Self {
        let root = Node {
            data: NodeData::Element {
                tag: "#document".to_string(),
                attrs: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Parse an XHTML-ish page snapshot into a document.
    pub fn parse(markup: &str) -> Result<Self, DomError> {
        parser::parse_document(markup)
    }

    /// Root node. Always attached, never removable.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// First `body` element in document order, or the root if none exists.
    pub fn body(&self) -> NodeId {
        self.descendants(self.root)
            .find(|&id| self.tag(id) == Some("body"))
            .unwrap_or(self.root)
    }

    fn push(&mut self, data: NodeData, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a child element. `parent` must be an element node.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.append_element_with_attrs(parent, tag, Vec::new())
    }

    /// Append a child element carrying attributes.
    pub fn append_element_with_attrs(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: Vec<(String, String)>,
    ) -> NodeId {
        self.push(
            NodeData::Element {
                tag: tag.to_string(),
                attrs,
            },
            parent,
        )
    }

    /// Append a text node. `parent` must be an element node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()), parent)
    }

    /// Element tag name, or `None` for text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// Text content, or `None` for element nodes.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// Attribute value on an element, `None` if absent or not an element.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Text(_))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Replace the content of a text node. Returns `false` if `id` is not a
    /// text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        match &mut self.nodes[id.0].data {
            NodeData::Text(content) => {
                *content = text.to_string();
                true
            }
            NodeData::Element { .. } => false,
        }
    }

    /// Detach `id` and its whole subtree. No-op for the root or for nodes
    /// that are already detached.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// True while `id` can still be reached from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Preorder walk of `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`Document::descendants`]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = &self.doc.nodes[id.0].children;
        self.stack.extend(children.iter().rev().copied());
        Some(id)
    }
}
