//! Node storage for a live document.
//!
//! Keys index directly into the slot vector (`key.0 - 1`) and are never reused.
//! Detaching a subtree keeps every node in it live; only `discard` frees slots.

use crate::error::DomError;
use html::{Attributes, Node, NodeKey};
use std::sync::Arc;

pub(crate) enum NodeKind {
    Document,
    Element { name: Arc<str>, attributes: Attributes },
    Text { text: String },
    Comment { text: String },
}

pub(crate) struct NodeRecord {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
}

impl NodeRecord {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element { .. })
    }
}

enum Slot {
    Reserved,
    Live(NodeRecord),
    Discarded,
}

/// Where a node sat before it was detached.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Detached {
    pub(crate) parent: NodeKey,
    pub(crate) previous_sibling: Option<NodeKey>,
    pub(crate) next_sibling: Option<NodeKey>,
}

pub(crate) struct DomArena {
    slots: Vec<Slot>,
}

impl DomArena {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn reserve(&mut self) -> NodeKey {
        self.slots.push(Slot::Reserved);
        NodeKey(self.slots.len() as u32)
    }

    fn slot_index(&self, key: NodeKey) -> Result<usize, DomError> {
        if key == NodeKey::INVALID || key.0 as usize > self.slots.len() {
            return Err(DomError::InvalidKey(key));
        }
        Ok(key.0 as usize - 1)
    }

    pub(crate) fn insert_node(&mut self, key: NodeKey, kind: NodeKind) -> Result<(), DomError> {
        let index = self.slot_index(key)?;
        match self.slots[index] {
            Slot::Reserved => {
                self.slots[index] = Slot::Live(NodeRecord::new(kind));
                Ok(())
            }
            Slot::Live(_) | Slot::Discarded => Err(DomError::DuplicateKey(key)),
        }
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeKey {
        let key = self.reserve();
        self.slots[key.0 as usize - 1] = Slot::Live(NodeRecord::new(kind));
        key
    }

    pub(crate) fn get(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        let index = self.slot_index(key)?;
        match &self.slots[index] {
            Slot::Live(record) => Ok(record),
            Slot::Reserved | Slot::Discarded => Err(DomError::MissingKey(key)),
        }
    }

    fn get_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, DomError> {
        let index = self.slot_index(key)?;
        match &mut self.slots[index] {
            Slot::Live(record) => Ok(record),
            Slot::Reserved | Slot::Discarded => Err(DomError::MissingKey(key)),
        }
    }

    pub(crate) fn is_live(&self, key: NodeKey) -> bool {
        self.get(key).is_ok()
    }

    pub(crate) fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.get(key).ok().and_then(|r| r.parent)
    }

    pub(crate) fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.get(key).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    /// Inclusive ancestor test: `ancestor == node` counts.
    pub(crate) fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }
        false
    }

    fn check_insertable(&self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        if !self.get(parent)?.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if matches!(self.get(child)?.kind, NodeKind::Document) {
            return Err(DomError::InvalidParent(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Detach `key` from its parent. Returns where it was, or `None` if it had no parent.
    pub(crate) fn detach(&mut self, key: NodeKey) -> Result<Option<Detached>, DomError> {
        let Some(parent) = self.get(key)?.parent else {
            return Ok(None);
        };
        let siblings = &mut self.get_mut(parent)?.children;
        let Some(pos) = siblings.iter().position(|k| *k == key) else {
            return Err(DomError::InvalidSibling { parent, before: key });
        };
        siblings.remove(pos);
        let previous_sibling = pos.checked_sub(1).map(|p| siblings[p]);
        let next_sibling = siblings.get(pos).copied();
        self.get_mut(key)?.parent = None;
        Ok(Some(Detached {
            parent,
            previous_sibling,
            next_sibling,
        }))
    }

    /// Insert a parentless `child` into `parent` at `index` (clamped to the end).
    fn attach_at(&mut self, parent: NodeKey, child: NodeKey, index: usize) -> Result<(), DomError> {
        let siblings = &mut self.get_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Validate an insertion without changing anything.
    pub(crate) fn check_insert(
        &self,
        parent: NodeKey,
        child: NodeKey,
        before: Option<NodeKey>,
    ) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        if let Some(before) = before {
            if self.get(before)?.parent != Some(parent) {
                return Err(DomError::InvalidSibling { parent, before });
            }
        }
        Ok(())
    }

    /// Attach a parentless `child` to `parent`, before `before` or at the end.
    pub(crate) fn attach(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: Option<NodeKey>,
    ) -> Result<(), DomError> {
        let index = match before {
            Some(before) => self
                .children(parent)
                .iter()
                .position(|k| *k == before)
                .ok_or(DomError::InvalidSibling { parent, before })?,
            None => self.children(parent).len(),
        };
        self.attach_at(parent, child, index)
    }

    pub(crate) fn set_attributes(
        &mut self,
        key: NodeKey,
        attributes: &[(Arc<str>, Option<String>)],
    ) -> Result<(), DomError> {
        match &mut self.get_mut(key)?.kind {
            NodeKind::Element { attributes: attrs, .. } => {
                attrs.clear();
                attrs.extend(attributes.iter().cloned());
                Ok(())
            }
            _ => Err(DomError::WrongNodeKind(key)),
        }
    }

    pub(crate) fn set_attribute(
        &mut self,
        key: NodeKey,
        name: &str,
        value: Option<String>,
    ) -> Result<(), DomError> {
        match &mut self.get_mut(key)?.kind {
            NodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
                    Some((_, existing)) => *existing = value,
                    None => attributes.push((Arc::from(name.to_ascii_lowercase()), value)),
                }
                Ok(())
            }
            _ => Err(DomError::WrongNodeKind(key)),
        }
    }

    pub(crate) fn set_text(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        match &mut self.get_mut(key)?.kind {
            NodeKind::Text { text: existing } | NodeKind::Comment { text: existing } => {
                existing.clear();
                existing.push_str(text);
                Ok(())
            }
            _ => Err(DomError::WrongNodeKind(key)),
        }
    }

    /// Free a detached subtree.
    pub(crate) fn discard_subtree(&mut self, key: NodeKey) -> Result<(), DomError> {
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let index = self.slot_index(current)?;
            if let Slot::Live(record) = std::mem::replace(&mut self.slots[index], Slot::Discarded) {
                stack.extend(record.children);
            }
        }
        Ok(())
    }

    /// Build nodes for an owned template tree; the returned root is detached.
    pub(crate) fn instantiate(&mut self, template: &Node) -> Result<NodeKey, DomError> {
        let kind = match template {
            Node::Document { .. } => return Err(DomError::WrongNodeKind(template.key())),
            Node::Element {
                name, attributes, ..
            } => NodeKind::Element {
                name: Arc::clone(name),
                attributes: attributes.clone(),
            },
            Node::Text { text, .. } => NodeKind::Text { text: text.clone() },
            Node::Comment { text, .. } => NodeKind::Comment { text: text.clone() },
        };
        let key = self.alloc(kind);
        for child in template.children() {
            let child_key = self.instantiate(child)?;
            self.attach_at(key, child_key, usize::MAX)?;
        }
        Ok(key)
    }

    pub(crate) fn materialize(&self, key: NodeKey) -> Result<Node, DomError> {
        let record = self.get(key)?;
        let children = record
            .children
            .iter()
            .map(|child| self.materialize(*child))
            .collect::<Result<Vec<_>, _>>()?;
        let node = match &record.kind {
            NodeKind::Document => Node::Document { key, children },
            NodeKind::Element { name, attributes } => Node::Element {
                key,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children,
            },
            NodeKind::Text { text } => Node::Text {
                key,
                text: text.clone(),
            },
            NodeKind::Comment { text } => Node::Comment {
                key,
                text: text.clone(),
            },
        };
        Ok(node)
    }
}
