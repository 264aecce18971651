//! Capability interface to the document.
//!
//! The portal never reaches for a global document. Everything it reads goes
//! through [`DomQuery`] and everything it writes or observes through
//! [`DomHost`], so the core can run against any document that provides these
//! operations. The in-memory [`dom::Document`] is the reference implementation.

use core_types::ObserverId;
use css::SelectorList;
use dom::{Document, DomError, MutationRecord, ObserveOptions};
use html::{Node, NodeKey};

/// Read-only document access. Resolver functions receive this view.
pub trait DomQuery {
    fn body(&self) -> NodeKey;
    fn exists(&self, node: NodeKey) -> bool;
    fn is_connected(&self, node: NodeKey) -> bool;
    fn parent(&self, node: NodeKey) -> Option<NodeKey>;
    fn children(&self, node: NodeKey) -> &[NodeKey];
    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool;
    fn attribute(&self, node: NodeKey, name: &str) -> Option<&str>;
    fn get_element_by_id(&self, id: &str) -> Option<NodeKey>;
    /// First connected element in tree order matching `list`.
    fn query_first(&self, list: &SelectorList) -> Option<NodeKey>;
    /// First element in `root`'s subtree (inclusive) matching `list`.
    fn query_first_within(&self, root: NodeKey, list: &SelectorList) -> Option<NodeKey>;
    fn matches(&self, node: NodeKey, list: &SelectorList) -> bool;
}

/// Mutation and observation capabilities used by the container manager and watcher.
pub trait DomHost: DomQuery {
    fn create_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeKey;
    fn instantiate(&mut self, template: &Node) -> Result<NodeKey, DomError>;
    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError>;
    fn prepend_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError>;
    fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    ) -> Result<(), DomError>;
    fn insert_after(&mut self, reference: NodeKey, node: NodeKey) -> Result<(), DomError>;
    fn remove(&mut self, node: NodeKey) -> Result<(), DomError>;
    fn discard(&mut self, node: NodeKey) -> Result<(), DomError>;
    fn clear_children(&mut self, parent: NodeKey) -> Result<(), DomError>;

    fn observe(&mut self, target: NodeKey, options: ObserveOptions) -> Result<ObserverId, DomError>;
    fn disconnect(&mut self, id: ObserverId) -> Result<(), DomError>;
    fn take_records(&mut self, id: ObserverId) -> Result<Vec<MutationRecord>, DomError>;
    fn pending_observers(&self) -> Vec<ObserverId>;
}

impl DomQuery for Document {
    fn body(&self) -> NodeKey {
        Document::body(self)
    }

    fn exists(&self, node: NodeKey) -> bool {
        Document::exists(self, node)
    }

    fn is_connected(&self, node: NodeKey) -> bool {
        Document::is_connected(self, node)
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        Document::parent(self, node)
    }

    fn children(&self, node: NodeKey) -> &[NodeKey] {
        Document::children(self, node)
    }

    fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        Document::contains(self, ancestor, node)
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        Document::attribute(self, node, name)
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeKey> {
        Document::get_element_by_id(self, id)
    }

    fn query_first(&self, list: &SelectorList) -> Option<NodeKey> {
        Document::query_first(self, list)
    }

    fn query_first_within(&self, root: NodeKey, list: &SelectorList) -> Option<NodeKey> {
        Document::query_first_within(self, root, list)
    }

    fn matches(&self, node: NodeKey, list: &SelectorList) -> bool {
        Document::matches_list(self, node, list)
    }
}

impl DomHost for Document {
    fn create_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeKey {
        Document::create_element_with(self, name, attributes)
    }

    fn instantiate(&mut self, template: &Node) -> Result<NodeKey, DomError> {
        Document::instantiate(self, template)
    }

    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        Document::append_child(self, parent, child)
    }

    fn prepend_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        Document::prepend_child(self, parent, child)
    }

    fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    ) -> Result<(), DomError> {
        Document::insert_before(self, parent, child, before)
    }

    fn insert_after(&mut self, reference: NodeKey, node: NodeKey) -> Result<(), DomError> {
        Document::insert_after(self, reference, node)
    }

    fn remove(&mut self, node: NodeKey) -> Result<(), DomError> {
        Document::remove(self, node)
    }

    fn discard(&mut self, node: NodeKey) -> Result<(), DomError> {
        Document::discard(self, node)
    }

    fn clear_children(&mut self, parent: NodeKey) -> Result<(), DomError> {
        Document::clear_children(self, parent)
    }

    fn observe(
        &mut self,
        target: NodeKey,
        options: ObserveOptions,
    ) -> Result<ObserverId, DomError> {
        Document::observe(self, target, options)
    }

    fn disconnect(&mut self, id: ObserverId) -> Result<(), DomError> {
        Document::disconnect(self, id)
    }

    fn take_records(&mut self, id: ObserverId) -> Result<Vec<MutationRecord>, DomError> {
        Document::take_records(self, id)
    }

    fn pending_observers(&self) -> Vec<ObserverId> {
        Document::pending_observers(self)
    }
}
