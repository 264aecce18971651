//! Dynamic anchor portal.
//!
//! Facade over the workspace crates: the live document (`dom`), selectors
//! (`css`), node trees and fragment parsing (`html`) and the portal core.
//!
//! ```
//! use anchor_portal::{PortalProps, PortalRoot};
//!
//! let mut root = PortalRoot::new();
//! let id = root.mount(PortalProps::new("#target")).unwrap();
//! assert_eq!(root.container(id), None);
//!
//! let body = root.document().body();
//! let target = root.document_mut().create_element_with("div", &[("id", "target")]);
//! root.document_mut().append_child(body, target).unwrap();
//! root.flush().unwrap();
//! assert_eq!(root.anchor(id), Some(target));
//! ```

pub use core_types::{ObserverId, PortalId};
pub use css::{SelectorError, SelectorList, parse_selector};
pub use dom::{Document, DomError, MutationRecord, ObserveOptions};
pub use html::{FragmentError, Node, NodeKey, parse_fragment};
pub use portal::{
    AddedNodeScan, AnchorError, AnchorSpec, Attachment, DomHost, DomQuery, DynamicPortal,
    ElementSlot, FlushStats, NonSelectorPolicy, PortalConfig, PortalError, PortalProps, PortalRoot,
    Position,
};
