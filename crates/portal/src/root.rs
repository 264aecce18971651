//! Driver owning a document and every portal mounted on it.
//!
//! Mutation records queue up inside the document; `flush` plays the role of
//! the microtask checkpoint and hands each instance its batch, in the order
//! the oldest queued records were produced, until nothing is left pending.

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::host::DomHost;
use crate::portal::DynamicPortal;
use crate::props::PortalProps;
use crate::watcher::Verdict;
use core_types::{ObserverId, PortalId};
use dom::Document;
use html::NodeKey;
use std::collections::{BTreeMap, HashMap};

/// Counters describing one `flush`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Delivery rounds that had at least one batch pending.
    pub rounds: usize,
    pub batches: usize,
    /// Batches made only of the receiving instance's own writes.
    pub skipped: usize,
    /// Resolution passes triggered by batches.
    pub passes: usize,
}

pub struct PortalRoot<H: DomHost = Document> {
    host: H,
    config: PortalConfig,
    portals: BTreeMap<PortalId, DynamicPortal>,
    observers: HashMap<ObserverId, PortalId>,
    next_id: u64,
}

impl PortalRoot<Document> {
    /// Empty document with the default configuration.
    pub fn new() -> Self {
        Self::with_host(Document::new(), PortalConfig::default())
    }

    pub fn with_config(config: PortalConfig) -> Self {
        Self::with_host(Document::new(), config)
    }
}

impl Default for PortalRoot<Document> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: DomHost> PortalRoot<H> {
    pub fn with_host(host: H, config: PortalConfig) -> Self {
        Self {
            host,
            config,
            portals: BTreeMap::new(),
            observers: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn document(&self) -> &H {
        &self.host
    }

    pub fn document_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Mounts a new instance, or updates the live one carrying the same key.
    pub fn mount(&mut self, props: PortalProps) -> Result<PortalId, PortalError> {
        if let Some(id) = props.key.as_deref().and_then(|key| self.find_key(key)) {
            self.update(id, props)?;
            return Ok(id);
        }
        let id = PortalId(self.next_id);
        self.next_id += 1;
        let portal = DynamicPortal::mount(id, props, &self.config, &mut self.host)?;
        if let Some(observer) = portal.observer() {
            self.observers.insert(observer, id);
        }
        self.portals.insert(id, portal);
        Ok(id)
    }

    /// Re-renders an instance with new props. Returns whether its container changed.
    pub fn update(&mut self, id: PortalId, props: PortalProps) -> Result<bool, PortalError> {
        let portal = self.portals.get_mut(&id).ok_or(PortalError::UnknownPortal(id))?;
        portal.update(props, &self.config, &mut self.host)
    }

    pub fn unmount(&mut self, id: PortalId) -> Result<(), PortalError> {
        let portal = self.portals.remove(&id).ok_or(PortalError::UnknownPortal(id))?;
        if let Some(observer) = portal.observer() {
            self.observers.remove(&observer);
        }
        portal.unmount(&mut self.host)
    }

    /// Runs one explicit resolution pass for `id`.
    pub fn resolve(&mut self, id: PortalId) -> Result<bool, PortalError> {
        let portal = self.portals.get_mut(&id).ok_or(PortalError::UnknownPortal(id))?;
        portal.reconcile(&self.config, &mut self.host)
    }

    /// Delivers pending mutation batches until no instance has any left.
    ///
    /// Batches produced while handling a round are delivered in the next
    /// round. Fails with `FlushLimit` when that keeps going for more than
    /// `max_flush_rounds` rounds.
    pub fn flush(&mut self) -> Result<FlushStats, PortalError> {
        let mut stats = FlushStats::default();
        loop {
            let pending: Vec<(ObserverId, PortalId)> = self
                .host
                .pending_observers()
                .into_iter()
                .filter_map(|observer| self.observers.get(&observer).map(|id| (observer, *id)))
                .collect();
            if pending.is_empty() {
                log::trace!(target: "portal.watch", "flush settled: {:?}", stats);
                return Ok(stats);
            }
            if stats.rounds >= self.config.max_flush_rounds {
                return Err(PortalError::FlushLimit { rounds: stats.rounds });
            }
            stats.rounds += 1;

            for (observer, id) in pending {
                let records = self.host.take_records(observer)?;
                let Some(portal) = self.portals.get_mut(&id) else {
                    continue;
                };
                stats.batches += 1;
                match portal.handle_batch(&records, &self.config, &mut self.host)? {
                    Verdict::OwnWrites => stats.skipped += 1,
                    Verdict::Trigger(_) => stats.passes += 1,
                    Verdict::Quiet => {}
                }
            }
        }
    }

    pub fn portal(&self, id: PortalId) -> Option<&DynamicPortal> {
        self.portals.get(&id)
    }

    pub fn container(&self, id: PortalId) -> Option<NodeKey> {
        self.portals.get(&id)?.container()
    }

    pub fn anchor(&self, id: PortalId) -> Option<NodeKey> {
        self.portals.get(&id)?.anchor()
    }

    pub fn resolution_passes(&self, id: PortalId) -> Option<u64> {
        self.portals.get(&id).map(DynamicPortal::resolution_passes)
    }

    pub fn find_key(&self, key: &str) -> Option<PortalId> {
        self.portals
            .values()
            .find(|portal| portal.key() == Some(key))
            .map(DynamicPortal::id)
    }

    pub fn ids(&self) -> impl Iterator<Item = PortalId> + '_ {
        self.portals.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_are_reported() {
        let mut root = PortalRoot::new();
        let missing = PortalId(42);
        assert!(matches!(
            root.unmount(missing),
            Err(PortalError::UnknownPortal(id)) if id == missing
        ));
        assert!(matches!(root.resolve(missing), Err(PortalError::UnknownPortal(_))));
        assert_eq!(root.container(missing), None);
    }

    #[test]
    fn flush_on_quiet_document_does_nothing() {
        let mut root = PortalRoot::new();
        root.mount(PortalProps::new("#nowhere")).unwrap();
        assert_eq!(root.flush().unwrap(), FlushStats::default());
    }

    #[test]
    fn keyed_mount_reuses_instance() {
        let mut root = PortalRoot::new();
        let first = root.mount(PortalProps::new("#a").key("toolbar")).unwrap();
        let again = root.mount(PortalProps::new("#b").key("toolbar")).unwrap();
        let other = root.mount(PortalProps::new("#a")).unwrap();
        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(root.len(), 2);
        assert_eq!(root.find_key("toolbar"), Some(first));
        assert_eq!(root.resolution_passes(first), Some(2));
    }

    #[test]
    fn foreign_observers_do_not_stall_flush() {
        let mut root = PortalRoot::new();
        let body = root.document().body();
        let foreign = root
            .document_mut()
            .observe(body, dom::ObserveOptions::default())
            .unwrap();
        root.mount(PortalProps::new("#a")).unwrap();
        let el = root.document_mut().create_element("p");
        root.document_mut().append_child(body, el).unwrap();
        let stats = root.flush().unwrap();
        assert_eq!(stats.rounds, 1);
        assert!(root.document().has_pending(foreign));
    }
}
