//! Node model shared by the document and the portal.
//!
//! - [`NodeKey`] is the identity of a live node.
//! - [`Node`] is an owned tree, used for content templates and for
//!   materialized snapshots of live subtrees.
//! - [`DomPatch`] is the structural edit vocabulary a document applies.

#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;
pub mod traverse;

mod dom_patch;
mod fragment;
mod types;

pub use crate::dom_patch::DomPatch;
pub use crate::fragment::{FragmentError, parse_fragment};
pub use crate::types::{Attributes, Node, NodeKey};
