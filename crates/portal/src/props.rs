use crate::anchor::{AnchorSpec, ElementSlot};
use crate::container::Position;
use crate::lifecycle::{Callbacks, LifecycleCallback};
use html::{FragmentError, Node, NodeKey, parse_fragment};
use std::fmt;

/// Everything a caller supplies for one render of a portal.
#[derive(Default)]
pub struct PortalProps {
    pub anchor: AnchorSpec,
    pub position: Position,
    /// Templates instantiated into the container.
    pub content: Vec<Node>,
    pub on_mount: Option<LifecycleCallback>,
    pub on_unmount: Option<LifecycleCallback>,
    /// Filled with the live container while one is attached.
    pub container_ref: Option<ElementSlot>,
    /// Identity used by `PortalRoot::mount` to reuse a live instance.
    pub key: Option<String>,
}

impl PortalProps {
    pub fn new(anchor: impl Into<AnchorSpec>) -> Self {
        Self {
            anchor: anchor.into(),
            ..Self::default()
        }
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    /// Parses `markup` into the content templates.
    pub fn markup(mut self, markup: &str) -> Result<Self, FragmentError> {
        self.content = parse_fragment(markup)?;
        Ok(self)
    }

    pub fn on_mount(mut self, f: impl FnMut(NodeKey, NodeKey) + 'static) -> Self {
        self.on_mount = Some(Box::new(f));
        self
    }

    pub fn on_unmount(mut self, f: impl FnMut(NodeKey, NodeKey) + 'static) -> Self {
        self.on_unmount = Some(Box::new(f));
        self
    }

    pub fn container_ref(mut self, slot: &ElementSlot) -> Self {
        self.container_ref = Some(slot.clone());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn into_parts(self) -> (Render, Callbacks) {
        let render = Render {
            anchor: self.anchor,
            position: self.position,
            content: self.content,
            key: self.key,
        };
        let callbacks = Callbacks {
            on_mount: self.on_mount,
            on_unmount: self.on_unmount,
            container_ref: self.container_ref,
        };
        (render, callbacks)
    }
}

impl fmt::Debug for PortalProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalProps")
            .field("anchor", &self.anchor)
            .field("position", &self.position)
            .field("content", &self.content.len())
            .field("on_mount", &self.on_mount.is_some())
            .field("on_unmount", &self.on_unmount.is_some())
            .field("container_ref", &self.container_ref)
            .field("key", &self.key)
            .finish()
    }
}

/// The non-callback half of the props, kept by the instance between renders.
pub(crate) struct Render {
    pub anchor: AnchorSpec,
    pub position: Position,
    pub content: Vec<Node>,
    pub key: Option<String>,
}
