//! DOM patch protocol.
//!
//! Patches are the write vocabulary of a live document: host pages, test
//! drivers and the portal itself describe structural edits as `DomPatch`
//! values and hand them to the document in order.
//!
//! Invariants:
//! - Patches are applied in order; a failing patch stops the batch and earlier
//!   patches stay applied.
//! - Create operations name keys the caller allocated from the document; all
//!   other operations reference keys that already exist.
//! - `AppendChild`/`InsertBefore` on a node that already has a parent moves it.
//! - `RemoveNode` detaches a subtree; the nodes remain addressable.
//! - Element and attribute names are expected to be canonical ASCII-lowercase.
//! - Operations must not create cycles; a node has at most one parent.

use crate::types::{Attributes, NodeKey};
use std::sync::Arc;

/// Structural DOM edit.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Create a detached element node with initial attributes.
    CreateElement {
        key: NodeKey,
        name: Arc<str>,
        attributes: Attributes,
    },
    /// Create a detached text node.
    CreateText { key: NodeKey, text: String },
    /// Create a detached comment node.
    CreateComment { key: NodeKey, text: String },
    /// Append a child to the end of a parent's children list.
    AppendChild { parent: NodeKey, child: NodeKey },
    /// Insert a child before an existing child of `parent`.
    InsertBefore {
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    },
    /// Detach a node (and its subtree) from its parent.
    RemoveNode { key: NodeKey },
    /// Replace all attributes on an element node.
    SetAttributes { key: NodeKey, attributes: Attributes },
    /// Replace the text content of a text node.
    SetText { key: NodeKey, text: String },
}

impl DomPatch {
    /// Whether this patch changes a children list (and so is observable as a
    /// child-list mutation).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DomPatch::AppendChild { .. }
                | DomPatch::InsertBefore { .. }
                | DomPatch::RemoveNode { .. }
        )
    }
}
