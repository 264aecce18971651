//! Child-list mutation observation.
//!
//! Every structural change produces one `MutationRecord`. At the moment of the
//! change, the record is queued for each observer whose target is the mutated
//! parent, or (with `subtree`) an ancestor of it. Queues are drained explicitly
//! with `take_records`; nothing is delivered behind the caller's back.

use core_types::{MutationSeq, ObserverId};
use html::NodeKey;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Observe the whole subtree below the target, not just its own children.
    pub subtree: bool,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self { subtree: true }
    }
}

/// One child-list change of `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub seq: MutationSeq,
    pub target: NodeKey,
    pub added: Vec<NodeKey>,
    pub removed: Vec<NodeKey>,
    pub previous_sibling: Option<NodeKey>,
    pub next_sibling: Option<NodeKey>,
}

struct ObserverEntry {
    target: NodeKey,
    options: ObserveOptions,
    queue: Vec<MutationRecord>,
}

pub(crate) struct ObserverRegistry {
    next_id: u32,
    entries: BTreeMap<ObserverId, ObserverEntry>,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            entries: BTreeMap::new(),
        }
    }

    pub(crate) fn register(&mut self, target: NodeKey, options: ObserveOptions) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            ObserverEntry {
                target,
                options,
                queue: Vec::new(),
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn contains(&self, id: ObserverId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue `record` for every interested observer.
    ///
    /// `is_ancestor(a, b)` must answer inclusive ancestry in the tree as it is
    /// right now, before the next mutation is applied.
    pub(crate) fn enqueue(
        &mut self,
        record: &MutationRecord,
        is_ancestor: impl Fn(NodeKey, NodeKey) -> bool,
    ) {
        for (id, entry) in self.entries.iter_mut() {
            let interested = entry.target == record.target
                || (entry.options.subtree && is_ancestor(entry.target, record.target));
            if interested {
                log::trace!(
                    target: "dom.observe",
                    "{id}: queue record seq={} target={} +{} -{}",
                    record.seq.0,
                    record.target.0,
                    record.added.len(),
                    record.removed.len()
                );
                entry.queue.push(record.clone());
            }
        }
    }

    pub(crate) fn take(&mut self, id: ObserverId) -> Option<Vec<MutationRecord>> {
        self.entries
            .get_mut(&id)
            .map(|entry| std::mem::take(&mut entry.queue))
    }

    pub(crate) fn has_pending(&self, id: ObserverId) -> bool {
        self.entries.get(&id).is_some_and(|e| !e.queue.is_empty())
    }

    /// Observers with queued records, ordered by their oldest queued record.
    pub(crate) fn pending(&self) -> Vec<ObserverId> {
        let mut pending: Vec<(MutationSeq, ObserverId)> = self
            .entries
            .iter()
            .filter_map(|(id, e)| e.queue.first().map(|r| (r.seq, *id)))
            .collect();
        pending.sort();
        pending.into_iter().map(|(_, id)| id).collect()
    }
}
