//! Mount/unmount notifications, exactly once per (anchor, container) pair.

use crate::anchor::ElementSlot;
use crate::container::Position;
use html::NodeKey;

/// Callback receiving `(anchor, container)`.
pub type LifecycleCallback = Box<dyn FnMut(NodeKey, NodeKey)>;

/// The pair currently active for one portal instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub anchor: NodeKey,
    pub container: NodeKey,
    pub position: Position,
}

#[derive(Default)]
pub struct Callbacks {
    pub on_mount: Option<LifecycleCallback>,
    pub on_unmount: Option<LifecycleCallback>,
    pub container_ref: Option<ElementSlot>,
}

#[derive(Default)]
pub struct LifecycleNotifier {
    callbacks: Callbacks,
    active: Option<Attachment>,
}

impl LifecycleNotifier {
    pub fn new(callbacks: Callbacks) -> Self {
        Self {
            callbacks,
            active: None,
        }
    }

    pub fn active(&self) -> Option<Attachment> {
        self.active
    }

    /// Swaps in the callbacks of a newer render. A different container ref
    /// takes over the live container; the old one is cleared.
    pub fn replace_callbacks(&mut self, callbacks: Callbacks) {
        let container = self.active.map(|a| a.container);
        match (&self.callbacks.container_ref, &callbacks.container_ref) {
            (Some(old), Some(new)) if old.ptr_eq(new) => {}
            (old, new) => {
                if let Some(old) = old {
                    old.set(None);
                }
                if let Some(new) = new {
                    new.set(container);
                }
            }
        }
        self.callbacks = callbacks;
    }

    /// Activates `attachment`, first releasing any pair still active.
    pub fn mounted(&mut self, attachment: Attachment) {
        if self.active.is_some() {
            self.unmounted();
        }
        self.active = Some(attachment);
        if let Some(slot) = &self.callbacks.container_ref {
            slot.set(Some(attachment.container));
        }
        log::debug!(
            target: "portal.lifecycle",
            "mount anchor={:?} container={:?}",
            attachment.anchor,
            attachment.container
        );
        if let Some(on_mount) = self.callbacks.on_mount.as_mut() {
            on_mount(attachment.anchor, attachment.container);
        }
    }

    /// Releases the active pair, if any, and reports it.
    pub fn unmounted(&mut self) -> Option<Attachment> {
        let attachment = self.active.take()?;
        if let Some(slot) = &self.callbacks.container_ref {
            slot.set(None);
        }
        log::debug!(
            target: "portal.lifecycle",
            "unmount anchor={:?} container={:?}",
            attachment.anchor,
            attachment.container
        );
        if let Some(on_unmount) = self.callbacks.on_unmount.as_mut() {
            on_unmount(attachment.anchor, attachment.container);
        }
        Some(attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pair(anchor: u32, container: u32) -> Attachment {
        Attachment {
            anchor: NodeKey(anchor),
            container: NodeKey(container),
            position: Position::Append,
        }
    }

    fn recording() -> (Rc<RefCell<Vec<String>>>, Callbacks, ElementSlot) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let slot = ElementSlot::new();
        let on_mount = Rc::clone(&log);
        let on_unmount = Rc::clone(&log);
        let callbacks = Callbacks {
            on_mount: Some(Box::new(move |a: NodeKey, c: NodeKey| {
                on_mount.borrow_mut().push(format!("mount {} {}", a.0, c.0))
            })),
            on_unmount: Some(Box::new(move |a: NodeKey, c: NodeKey| {
                on_unmount.borrow_mut().push(format!("unmount {} {}", a.0, c.0))
            })),
            container_ref: Some(slot.clone()),
        };
        (log, callbacks, slot)
    }

    #[test]
    fn swap_unmounts_before_mounting() {
        let (log, callbacks, slot) = recording();
        let mut notifier = LifecycleNotifier::new(callbacks);
        notifier.mounted(pair(1, 2));
        assert_eq!(slot.get(), Some(NodeKey(2)));
        notifier.mounted(pair(3, 4));
        assert_eq!(slot.get(), Some(NodeKey(4)));
        assert_eq!(notifier.unmounted(), Some(pair(3, 4)));
        assert_eq!(notifier.unmounted(), None);
        assert_eq!(slot.get(), None);
        assert_eq!(*log.borrow(), ["mount 1 2", "unmount 1 2", "mount 3 4", "unmount 3 4"]);
    }

    #[test]
    fn new_container_ref_takes_over() {
        let (_, callbacks, old) = recording();
        let mut notifier = LifecycleNotifier::new(callbacks);
        notifier.mounted(pair(1, 2));

        let fresh = ElementSlot::new();
        notifier.replace_callbacks(Callbacks {
            container_ref: Some(fresh.clone()),
            ..Callbacks::default()
        });
        assert_eq!(old.get(), None);
        assert_eq!(fresh.get(), Some(NodeKey(2)));
    }
}
