use crate::arena::{Detached, DomArena, NodeKind, NodeRecord};
use crate::error::DomError;
use crate::observer::{MutationRecord, ObserveOptions, ObserverRegistry};
use core_types::{MutationSeq, ObserverId};
use html::{Attributes, DomPatch, Node, NodeKey};
use std::sync::Arc;

/// A live document: `#document > html > (head, body)` plus detached nodes.
///
/// All writes go through this type so that structural changes are turned into
/// `MutationRecord`s for registered observers and counted in `mutation_count`.
pub struct Document {
    arena: DomArena,
    root: NodeKey,
    document_element: NodeKey,
    head: NodeKey,
    body: NodeKey,
    observers: ObserverRegistry,
    seq: MutationSeq,
}

impl Document {
    pub fn new() -> Self {
        let mut arena = DomArena::new();
        let root = arena.alloc(NodeKind::Document);
        let document_element = arena.alloc(element_kind("html"));
        let head = arena.alloc(element_kind("head"));
        let body = arena.alloc(element_kind("body"));
        let mut doc = Self {
            arena,
            root,
            document_element,
            head,
            body,
            observers: ObserverRegistry::new(),
            seq: MutationSeq::INITIAL,
        };
        // Nothing can observe yet and the skeleton does not count as page mutations.
        let skeleton = [
            (root, document_element),
            (document_element, head),
            (document_element, body),
        ];
        for (parent, child) in skeleton {
            let attached = doc.arena.attach(parent, child, None);
            debug_assert!(attached.is_ok(), "document skeleton must attach");
        }
        doc
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn document_element(&self) -> NodeKey {
        self.document_element
    }

    pub fn head(&self) -> NodeKey {
        self.head
    }

    pub fn body(&self) -> NodeKey {
        self.body
    }

    /// Number of writes (structural, attribute and text) applied so far.
    pub fn mutation_count(&self) -> MutationSeq {
        self.seq
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Reserve a key for a later `DomPatch::Create*`.
    pub fn allocate_key(&mut self) -> NodeKey {
        self.arena.reserve()
    }

    pub fn create_element(&mut self, name: &str) -> NodeKey {
        self.arena.alloc(element_kind(name))
    }

    pub fn create_element_with(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeKey {
        self.arena.alloc(NodeKind::Element {
            name: Arc::from(name.to_ascii_lowercase()),
            attributes: attributes
                .iter()
                .map(|(k, v)| (Arc::from(k.to_ascii_lowercase()), Some((*v).to_string())))
                .collect(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.arena.alloc(NodeKind::Text {
            text: text.to_string(),
        })
    }

    pub fn create_comment(&mut self, text: &str) -> NodeKey {
        self.arena.alloc(NodeKind::Comment {
            text: text.to_string(),
        })
    }

    /// Create detached nodes for a template tree and return the detached root.
    pub fn instantiate(&mut self, template: &Node) -> Result<NodeKey, DomError> {
        self.arena.instantiate(template)
    }

    /// Owned copy of the subtree rooted at `key`, keys included.
    pub fn materialize(&self, key: NodeKey) -> Result<Node, DomError> {
        self.arena.materialize(key)
    }

    // ------------------------------------------------------------------
    // Structural writes
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if it already has a parent.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.insert(parent, child, None)
    }

    /// Insert `child` into `parent` right before `before`, moving it if needed.
    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    ) -> Result<(), DomError> {
        if child == before {
            // Inserting a node before itself leaves the tree unchanged.
            self.arena.check_insert(parent, child, Some(before))?;
            return Ok(());
        }
        self.insert(parent, child, Some(before))
    }

    /// Insert `child` so it becomes the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        match self.first_child(parent) {
            Some(first) => self.insert_before(parent, child, first),
            None => self.append_child(parent, child),
        }
    }

    /// Insert `node` as the sibling right after `reference`.
    pub fn insert_after(&mut self, reference: NodeKey, node: NodeKey) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::InvalidParent(reference))?;
        match self.next_sibling(reference) {
            Some(next) => self.insert_before(parent, node, next),
            None => self.append_child(parent, node),
        }
    }

    fn insert(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: Option<NodeKey>,
    ) -> Result<(), DomError> {
        self.arena.check_insert(parent, child, before)?;
        if let Some(detached) = self.arena.detach(child)? {
            self.record_removal(child, detached);
        }
        self.arena.attach(parent, child, before)?;
        let previous_sibling = self.previous_sibling(child);
        let next_sibling = self.next_sibling(child);
        self.seq = self.seq.next();
        let record = MutationRecord {
            seq: self.seq,
            target: parent,
            added: vec![child],
            removed: Vec::new(),
            previous_sibling,
            next_sibling,
        };
        self.dispatch(record);
        Ok(())
    }

    /// Detach `key` from its parent; the subtree stays addressable. No-op when parentless.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), DomError> {
        if let Some(detached) = self.arena.detach(key)? {
            self.record_removal(key, detached);
        }
        Ok(())
    }

    /// Detach and free `key` with its whole subtree; later lookups report `MissingKey`.
    pub fn discard(&mut self, key: NodeKey) -> Result<(), DomError> {
        self.remove(key)?;
        self.arena.discard_subtree(key)
    }

    /// Remove every child of `parent`, one record per child.
    pub fn clear_children(&mut self, parent: NodeKey) -> Result<(), DomError> {
        let children = self.arena.get(parent)?.children.clone();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    fn record_removal(&mut self, key: NodeKey, detached: Detached) {
        self.seq = self.seq.next();
        let record = MutationRecord {
            seq: self.seq,
            target: detached.parent,
            added: Vec::new(),
            removed: vec![key],
            previous_sibling: detached.previous_sibling,
            next_sibling: detached.next_sibling,
        };
        self.dispatch(record);
    }

    fn dispatch(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let arena = &self.arena;
        self.observers
            .enqueue(&record, |ancestor, node| arena.contains(ancestor, node));
    }

    // ------------------------------------------------------------------
    // Attribute and text writes (not observed, but counted)
    // ------------------------------------------------------------------

    pub fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        self.arena.set_attribute(key, name, Some(value.to_string()))?;
        self.seq = self.seq.next();
        Ok(())
    }

    pub fn set_attributes(
        &mut self,
        key: NodeKey,
        attributes: &Attributes,
    ) -> Result<(), DomError> {
        self.arena.set_attributes(key, attributes)?;
        self.seq = self.seq.next();
        Ok(())
    }

    pub fn set_text(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        self.arena.set_text(key, text)?;
        self.seq = self.seq.next();
        Ok(())
    }

    /// Apply a patch batch in order. Stops at the first failing patch.
    pub fn apply(&mut self, patches: &[DomPatch]) -> Result<(), DomError> {
        for patch in patches {
            self.apply_one(patch)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, patch: &DomPatch) -> Result<(), DomError> {
        match patch {
            DomPatch::CreateElement {
                key,
                name,
                attributes,
            } => self.arena.insert_node(
                *key,
                NodeKind::Element {
                    name: Arc::clone(name),
                    attributes: attributes.clone(),
                },
            ),
            DomPatch::CreateText { key, text } => {
                self.arena.insert_node(*key, NodeKind::Text { text: text.clone() })
            }
            DomPatch::CreateComment { key, text } => {
                self.arena
                    .insert_node(*key, NodeKind::Comment { text: text.clone() })
            }
            DomPatch::AppendChild { parent, child } => self.append_child(*parent, *child),
            DomPatch::InsertBefore {
                parent,
                child,
                before,
            } => self.insert_before(*parent, *child, *before),
            DomPatch::RemoveNode { key } => self.remove(*key),
            DomPatch::SetAttributes { key, attributes } => self.set_attributes(*key, attributes),
            DomPatch::SetText { key, text } => self.set_text(*key, text),
            _ => Err(DomError::UnsupportedPatch),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn exists(&self, key: NodeKey) -> bool {
        self.arena.is_live(key)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.arena.parent(key)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.arena.children(key)
    }

    pub fn first_child(&self, key: NodeKey) -> Option<NodeKey> {
        self.children(key).first().copied()
    }

    pub fn last_child(&self, key: NodeKey) -> Option<NodeKey> {
        self.children(key).last().copied()
    }

    pub fn next_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.parent(key)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|k| *k == key)?;
        siblings.get(pos + 1).copied()
    }

    pub fn previous_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.parent(key)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|k| *k == key)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Inclusive: a node contains itself.
    pub fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        self.arena.contains(ancestor, node)
    }

    pub fn is_connected(&self, key: NodeKey) -> bool {
        self.exists(key) && self.contains(self.root, key)
    }

    pub fn is_element(&self, key: NodeKey) -> bool {
        matches!(self.record(key).map(|r| &r.kind), Some(NodeKind::Element { .. }))
    }

    pub fn local_name(&self, key: NodeKey) -> Option<&str> {
        match &self.record(key)?.kind {
            NodeKind::Element { name, .. } => Some(&**name),
            _ => None,
        }
    }

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        match &self.record(key)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .and_then(|(_, v)| v.as_deref()),
            _ => None,
        }
    }

    pub fn text(&self, key: NodeKey) -> Option<&str> {
        match &self.record(key)?.kind {
            NodeKind::Text { text } | NodeKind::Comment { text } => Some(text.as_str()),
            _ => None,
        }
    }

    pub(crate) fn record(&self, key: NodeKey) -> Option<&NodeRecord> {
        self.arena.get(key).ok()
    }

    /// Pre-order walk of `root`'s subtree (inclusive).
    pub fn descendants(&self, root: NodeKey) -> Descendants<'_> {
        let stack = if self.exists(root) { vec![root] } else { Vec::new() };
        Descendants { doc: self, stack }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub fn observe(
        &mut self,
        target: NodeKey,
        options: ObserveOptions,
    ) -> Result<ObserverId, DomError> {
        self.arena.get(target)?;
        let id = self.observers.register(target, options);
        log::debug!(
            target: "dom.observe",
            "{id}: observing node {} subtree={}",
            target.0,
            options.subtree
        );
        Ok(id)
    }

    /// Unregister an observer; its queued records are dropped.
    pub fn disconnect(&mut self, id: ObserverId) -> Result<(), DomError> {
        if !self.observers.remove(id) {
            return Err(DomError::UnknownObserver(id));
        }
        log::debug!(target: "dom.observe", "{id}: disconnected");
        Ok(())
    }

    pub fn is_observing(&self, id: ObserverId) -> bool {
        self.observers.contains(id)
    }

    /// Drain the queued records of one observer, oldest first.
    pub fn take_records(&mut self, id: ObserverId) -> Result<Vec<MutationRecord>, DomError> {
        self.observers.take(id).ok_or(DomError::UnknownObserver(id))
    }

    pub fn has_pending(&self, id: ObserverId) -> bool {
        self.observers.has_pending(id)
    }

    /// Observers with queued records, ordered by their oldest queued record.
    pub fn pending_observers(&self) -> Vec<ObserverId> {
        self.observers.pending()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn element_kind(name: &str) -> NodeKind {
    NodeKind::Element {
        name: Arc::from(name.to_ascii_lowercase()),
        attributes: Vec::new(),
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeKey>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let key = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(key).iter().rev().copied());
        Some(key)
    }
}
