//! One dynamic portal instance: resolution, container, watcher and lifecycle
//! tied together.

use crate::anchor;
use crate::config::PortalConfig;
use crate::container;
use crate::error::PortalError;
use crate::host::DomHost;
use crate::lifecycle::{Attachment, LifecycleNotifier};
use crate::props::{PortalProps, Render};
use crate::watcher::{MutationWatcher, OwnWrite, Trigger, Verdict, WatchState};
use core_types::{ObserverId, PortalId};
use css::SelectorList;
use dom::MutationRecord;
use html::NodeKey;

pub struct DynamicPortal {
    id: PortalId,
    render: Render,
    selector: Option<SelectorList>,
    watcher: MutationWatcher,
    notifier: LifecycleNotifier,
    /// Anchor seen leaving the document; not re-hosted while it stays detached.
    departed: Option<NodeKey>,
    passes: u64,
}

impl DynamicPortal {
    /// Subscribes to the document and runs the first resolution pass.
    ///
    /// On failure the subscription is torn down again before the error is
    /// returned.
    pub fn mount<H: DomHost>(
        id: PortalId,
        props: PortalProps,
        config: &PortalConfig,
        host: &mut H,
    ) -> Result<Self, PortalError> {
        let selector = props.anchor.compile()?;
        let (render, callbacks) = props.into_parts();
        let watcher = MutationWatcher::subscribe(host)?;
        let mut portal = Self {
            id,
            render,
            selector,
            watcher,
            notifier: LifecycleNotifier::new(callbacks),
            departed: None,
            passes: 0,
        };
        log::debug!(target: "portal.lifecycle", "{id} mounting with {:?}", portal.render.anchor);
        if let Err(err) = portal.reconcile(config, host) {
            portal.watcher.dispose(host)?;
            return Err(err);
        }
        Ok(portal)
    }

    /// Applies a new render. Invalid selector text leaves the previous props in place.
    pub fn update<H: DomHost>(
        &mut self,
        props: PortalProps,
        config: &PortalConfig,
        host: &mut H,
    ) -> Result<bool, PortalError> {
        let selector = props.anchor.compile()?;
        let (render, callbacks) = props.into_parts();
        let content_changed = render.content != self.render.content;
        self.render = render;
        self.selector = selector;
        self.notifier.replace_callbacks(callbacks);

        if content_changed {
            if let Some(active) = self.notifier.active() {
                container::project(host, active.container, &self.render.content)?;
            }
        }
        self.reconcile(config, host)
    }

    /// One resolution pass. Returns whether the container changed.
    ///
    /// When the anchor is unchanged and the container still sits where it
    /// belongs, the document is left untouched.
    pub fn reconcile<H: DomHost>(
        &mut self,
        config: &PortalConfig,
        host: &mut H,
    ) -> Result<bool, PortalError> {
        self.passes += 1;
        let position = self.render.position;
        let resolved = anchor::resolve(&self.render.anchor, self.selector.as_ref(), &*host)?;
        if self.departed.is_some_and(|departed| host.is_connected(departed)) {
            self.departed = None;
        }
        let target = resolved
            .filter(|anchor| self.departed != Some(*anchor))
            .filter(|anchor| container::can_host(&*host, *anchor, position));

        let mut changed = false;
        if let Some(active) = self.notifier.active() {
            let unchanged = target == Some(active.anchor)
                && active.position == position
                && container::is_positioned(&*host, active.container, active.anchor, position);
            if unchanged {
                log::trace!(
                    target: "portal.resolve",
                    "{} pass {}: unchanged",
                    self.id,
                    self.passes
                );
                return Ok(false);
            }
            self.release(host)?;
            changed = true;
        }

        let Some(anchor) = target else {
            log::trace!(target: "portal.resolve", "{} pass {}: no anchor", self.id, self.passes);
            return Ok(changed);
        };
        if let Some(container) =
            container::materialize(host, config, self.id, anchor, position, &self.render.content)?
        {
            if let Some(parent) = host.parent(container) {
                self.watcher.note_own_write(OwnWrite::Inserted {
                    node: container,
                    parent,
                });
            }
            self.notifier.mounted(Attachment {
                anchor,
                container,
                position,
            });
            changed = true;
        }
        Ok(changed)
    }

    /// Feeds one delivered batch through the watcher, re-resolving when it asks to.
    pub fn handle_batch<H: DomHost>(
        &mut self,
        records: &[MutationRecord],
        config: &PortalConfig,
        host: &mut H,
    ) -> Result<Verdict, PortalError> {
        let active = self.notifier.active();
        let state = WatchState {
            anchor: active.map(|a| a.anchor),
            container: active.map(|a| a.container),
            selector: self.selector.as_ref(),
        };
        let verdict = self.watcher.classify(records, &state, config, &*host);
        if let Verdict::Trigger(trigger) = verdict {
            if trigger == Trigger::AnchorRemoved {
                self.departed = state.anchor;
            }
            log::debug!(target: "portal.watch", "{} re-resolving: {trigger}", self.id);
            self.reconcile(config, host)?;
        }
        Ok(verdict)
    }

    /// Disconnects the observer and releases the container.
    pub fn unmount<H: DomHost>(mut self, host: &mut H) -> Result<(), PortalError> {
        log::debug!(target: "portal.lifecycle", "{} unmounting", self.id);
        self.watcher.dispose(host)?;
        self.release(host)
    }

    fn release<H: DomHost>(&mut self, host: &mut H) -> Result<(), PortalError> {
        let Some(active) = self.notifier.active() else {
            return Ok(());
        };
        // A container someone else already took out produces no record of ours.
        if let Some(parent) = host.parent(active.container) {
            container::detach(host, active.container)?;
            self.watcher.note_own_write(OwnWrite::Removed {
                node: active.container,
                parent,
            });
        }
        self.notifier.unmounted();
        container::dispose(host, active.container)?;
        log::debug!(
            target: "portal.container",
            "{} released container {:?}",
            self.id,
            active.container
        );
        Ok(())
    }

    pub fn id(&self) -> PortalId {
        self.id
    }

    pub fn key(&self) -> Option<&str> {
        self.render.key.as_deref()
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.watcher.observer()
    }

    pub fn anchor(&self) -> Option<NodeKey> {
        self.notifier.active().map(|a| a.anchor)
    }

    pub fn container(&self) -> Option<NodeKey> {
        self.notifier.active().map(|a| a.container)
    }

    pub fn attachment(&self) -> Option<Attachment> {
        self.notifier.active()
    }

    /// Number of resolution passes run so far, the mount pass included.
    pub fn resolution_passes(&self) -> u64 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Position;
    use dom::Document;

    #[test]
    fn unchanged_pass_touches_nothing() {
        let mut doc = Document::new();
        let body = doc.body();
        let anchor = doc.create_element_with("div", &[("id", "a")]);
        doc.append_child(body, anchor).unwrap();
        let config = PortalConfig::default();

        let props = PortalProps::new("#a");
        let mut portal = DynamicPortal::mount(PortalId(1), props, &config, &mut doc).unwrap();
        let container = portal.container().unwrap();
        let before = doc.mutation_count();
        assert!(!portal.reconcile(&config, &mut doc).unwrap());
        assert_eq!(doc.mutation_count(), before);
        assert_eq!(portal.container(), Some(container));
        assert_eq!(portal.resolution_passes(), 2);
    }

    #[test]
    fn position_change_recreates_container() {
        let mut doc = Document::new();
        let body = doc.body();
        let anchor = doc.create_element("div");
        doc.append_child(body, anchor).unwrap();
        let config = PortalConfig::default();

        let props = PortalProps::new(anchor);
        let mut portal = DynamicPortal::mount(PortalId(1), props, &config, &mut doc).unwrap();
        let first = portal.container().unwrap();
        portal
            .update(PortalProps::new(anchor).position(Position::After), &config, &mut doc)
            .unwrap();
        let second = portal.container().unwrap();
        assert_ne!(first, second);
        assert!(!doc.exists(first));
        assert_eq!(doc.next_sibling(anchor), Some(second));
    }

    #[test]
    fn invalid_selector_on_update_keeps_previous_render() {
        let mut doc = Document::new();
        let body = doc.body();
        let anchor = doc.create_element_with("div", &[("id", "a")]);
        doc.append_child(body, anchor).unwrap();
        let config = PortalConfig::default();

        let props = PortalProps::new("#a");
        let mut portal = DynamicPortal::mount(PortalId(1), props, &config, &mut doc).unwrap();
        let err = portal.update(PortalProps::new("#a >"), &config, &mut doc).unwrap_err();
        assert!(matches!(err, PortalError::Anchor(_)));
        assert_eq!(portal.anchor(), Some(anchor));
        assert!(!portal.reconcile(&config, &mut doc).unwrap());
    }

    #[test]
    fn failed_mount_leaves_no_observer_behind() {
        let mut doc = Document::new();
        let config = PortalConfig::default();
        let props = PortalProps::new(crate::anchor::AnchorSpec::resolver(|_| {
            Err(crate::error::AnchorError::resolver("nope"))
        }));
        let err = DynamicPortal::mount(PortalId(1), props, &config, &mut doc).err().unwrap();
        assert!(matches!(err, PortalError::Anchor(_)));
        assert!(doc.pending_observers().is_empty());
        assert!(!doc.is_observing(ObserverId(1)));
    }
}
