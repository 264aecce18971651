use std::sync::Arc;

/// Stable identity of a node inside one live document.
///
/// Keys are allocated by the document and never reused, so a key held after the
/// node was detached still refers to that same node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

impl NodeKey {
    /// Reserved sentinel for "unassigned" identity (templates not yet instantiated).
    pub const INVALID: NodeKey = NodeKey(0);

    pub fn is_valid(self) -> bool {
        self != NodeKey::INVALID
    }
}

pub type Attributes = Vec<(Arc<str>, Option<String>)>;

/// Owned node tree.
///
/// Used both as a content template (keys are `NodeKey::INVALID`) and as the
/// materialized form of a live document subtree (keys are assigned).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        key: NodeKey,
        children: Vec<Node>,
    },
    Element {
        key: NodeKey,
        name: Arc<str>,
        attributes: Attributes,
        children: Vec<Node>,
    },
    Text {
        key: NodeKey,
        text: String,
    },
    Comment {
        key: NodeKey,
        text: String,
    },
}

impl Node {
    pub fn element(name: &str) -> Node {
        Node::Element {
            key: NodeKey::INVALID,
            name: Arc::from(name.to_ascii_lowercase()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Node {
        Node::Text {
            key: NodeKey::INVALID,
            text: text.into(),
        }
    }

    pub fn comment(text: impl Into<String>) -> Node {
        Node::Comment {
            key: NodeKey::INVALID,
            text: text.into(),
        }
    }

    /// Builder-style attribute push; ignored on non-element nodes.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Node {
        if let Node::Element { attributes, .. } = &mut self {
            attributes.push((Arc::from(name.to_ascii_lowercase()), Some(value.into())));
        }
        self
    }

    /// Builder-style child push; ignored on text and comment nodes.
    pub fn with_child(mut self, child: Node) -> Node {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    pub fn key(&self) -> NodeKey {
        match self {
            Node::Document { key, .. } => *key,
            Node::Element { key, .. } => *key,
            Node::Text { key, .. } => *key,
            Node::Comment { key, .. } => *key,
        }
    }

    pub fn set_key(&mut self, new_key: NodeKey) {
        match self {
            Node::Document { key, .. } => *key = new_key,
            Node::Element { key, .. } => *key = new_key,
            Node::Text { key, .. } => *key = new_key,
            Node::Comment { key, .. } => *key = new_key,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(&**name),
            _ => None,
        }
    }

    pub fn attribute(&self, wanted: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(wanted))
                .and_then(|(_, v)| v.as_deref()),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            Node::Text { .. } | Node::Comment { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } => Some(children),
            Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }
}
