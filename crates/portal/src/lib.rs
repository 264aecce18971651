//! Dynamic anchor portal.
//!
//! Renders content at a document location that may not exist yet. An
//! [`AnchorSpec`] is resolved to an element, a transparent container is kept
//! next to or inside it, and a body-wide mutation watcher re-resolves when a
//! delivered batch may have changed the answer. Mount and unmount callbacks
//! fire exactly once per (anchor, container) pair.
//!
//! [`PortalRoot`] drives instances against an owned document; the per-instance
//! machinery in [`DynamicPortal`] works against any [`DomHost`].

pub mod anchor;
pub mod config;
pub mod container;
mod error;
pub mod host;
pub mod lifecycle;
pub mod portal;
mod props;
mod root;
pub mod watcher;

pub use crate::anchor::{AnchorSpec, ElementSlot, ResolverFn, WeakElement};
pub use crate::config::{AddedNodeScan, NonSelectorPolicy, PortalConfig};
pub use crate::container::Position;
pub use crate::error::{AnchorError, PortalError};
pub use crate::host::{DomHost, DomQuery};
pub use crate::lifecycle::{Attachment, LifecycleCallback};
pub use crate::portal::DynamicPortal;
pub use crate::props::PortalProps;
pub use crate::root::{FlushStats, PortalRoot};
pub use crate::watcher::{MutationWatcher, OwnWrite, Trigger, Verdict, WatchState};
