//! Mutation watcher: decides whether a delivered batch can have invalidated
//! the current resolution.
//!
//! Classification is cheap and side-effect free apart from consuming the
//! own-write ledger. A batch is first stripped of the instance's own writes;
//! whatever remains is checked against the triggers in order of severity.
//!
//! The ledger holds the exact child-list edits the instance made. Each record
//! consumes the entries it accounts for, so a later edit of the same node by
//! somebody else is still foreign.

use crate::config::{AddedNodeScan, NonSelectorPolicy, PortalConfig};
use crate::host::{DomHost, DomQuery};
use core_types::ObserverId;
use css::SelectorList;
use dom::{DomError, MutationRecord, ObserveOptions};
use html::NodeKey;
use std::fmt;

/// Why a batch asks for a new resolution pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The anchor, or one of its ancestors, was removed.
    AnchorRemoved,
    /// Someone else took the container out of the document.
    ContainerRemoved,
    /// An added node matches the anchor selector.
    CandidateAdded,
    /// Any foreign change, under `NonSelectorPolicy::AnyExternalMutation`.
    ExternalMutation,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::AnchorRemoved => "anchor removed",
            Trigger::ContainerRemoved => "container removed",
            Trigger::CandidateAdded => "candidate added",
            Trigger::ExternalMutation => "external mutation",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// No trigger fired, or the batch was empty.
    Quiet,
    /// Every record was caused by this instance; ignored wholesale.
    OwnWrites,
    Trigger(Trigger),
}

impl Verdict {
    pub fn trigger(self) -> Option<Trigger> {
        match self {
            Verdict::Trigger(trigger) => Some(trigger),
            _ => None,
        }
    }
}

/// A child-list edit made by the instance itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnWrite {
    Inserted { node: NodeKey, parent: NodeKey },
    Removed { node: NodeKey, parent: NodeKey },
}

/// What the watcher compares a batch against.
#[derive(Clone, Copy, Debug, Default)]
pub struct WatchState<'a> {
    pub anchor: Option<NodeKey>,
    pub container: Option<NodeKey>,
    /// Present for selector anchors only.
    pub selector: Option<&'a SelectorList>,
}

#[derive(Debug, Default)]
pub struct MutationWatcher {
    observer: Option<ObserverId>,
    own_writes: Vec<OwnWrite>,
}

impl MutationWatcher {
    /// Watcher with no subscription; batches are fed by hand.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Registers one observer over the whole body subtree.
    pub fn subscribe<H: DomHost>(host: &mut H) -> Result<Self, DomError> {
        let body = host.body();
        let observer = host.observe(body, ObserveOptions { subtree: true })?;
        log::trace!(target: "portal.watch", "subscribed {observer} on body {:?}", body);
        Ok(Self {
            observer: Some(observer),
            own_writes: Vec::new(),
        })
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.observer
    }

    /// Disconnects the observer; later calls are no-ops.
    pub fn dispose<H: DomHost>(&mut self, host: &mut H) -> Result<(), DomError> {
        self.own_writes.clear();
        match self.observer.take() {
            Some(observer) => {
                log::trace!(target: "portal.watch", "disposing {observer}");
                host.disconnect(observer)
            }
            None => Ok(()),
        }
    }

    /// Remembers an edit this instance is about to see delivered back.
    pub fn note_own_write(&mut self, write: OwnWrite) {
        self.own_writes.push(write);
    }

    pub fn classify(
        &mut self,
        records: &[MutationRecord],
        state: &WatchState<'_>,
        config: &PortalConfig,
        dom: &dyn DomQuery,
    ) -> Verdict {
        let mut ledger = std::mem::take(&mut self.own_writes);
        let foreign: Vec<&MutationRecord> = records
            .iter()
            .filter(|record| {
                let inside = state.container.is_some_and(|c| dom.contains(c, record.target));
                !inside && !consume_own(&mut ledger, record)
            })
            .collect();
        if foreign.is_empty() {
            let verdict = if records.is_empty() {
                Verdict::Quiet
            } else {
                Verdict::OwnWrites
            };
            log::trace!(
                target: "portal.watch",
                "{} record(s), all own: {:?}",
                records.len(),
                verdict
            );
            return verdict;
        }

        let mut best: Option<Trigger> = None;
        for record in foreign {
            if let Some(trigger) = self.record_trigger(record, state, config, dom) {
                if trigger == Trigger::AnchorRemoved {
                    best = Some(trigger);
                    break;
                }
                best.get_or_insert(trigger);
            }
        }
        let verdict = best.map_or(Verdict::Quiet, Verdict::Trigger);
        log::trace!(
            target: "portal.watch",
            "{} record(s) classified as {:?}",
            records.len(),
            verdict
        );
        verdict
    }

    fn record_trigger(
        &self,
        record: &MutationRecord,
        state: &WatchState<'_>,
        config: &PortalConfig,
        dom: &dyn DomQuery,
    ) -> Option<Trigger> {
        let removed_covers =
            |node: NodeKey| record.removed.iter().any(|r| dom.contains(*r, node));
        if state.anchor.is_some_and(removed_covers) {
            return Some(Trigger::AnchorRemoved);
        }
        if state.container.is_some_and(removed_covers) {
            return Some(Trigger::ContainerRemoved);
        }
        match state.selector {
            Some(list) => {
                let hit = record.added.iter().any(|added| match config.added_node_scan {
                    AddedNodeScan::Subtree => dom.query_first_within(*added, list).is_some(),
                    AddedNodeScan::NodeOnly => dom.matches(*added, list),
                });
                hit.then_some(Trigger::CandidateAdded)
            }
            None => match config.non_selector_policy {
                NonSelectorPolicy::AnchorRemovalOnly => None,
                NonSelectorPolicy::AnyExternalMutation => Some(Trigger::ExternalMutation),
            },
        }
    }
}

/// Consumes the ledger entries covering every node `record` touches.
///
/// Either the whole record is accounted for and its entries are removed, or
/// nothing is consumed and the record counts as foreign.
fn consume_own(ledger: &mut Vec<OwnWrite>, record: &MutationRecord) -> bool {
    let parent = record.target;
    let expected = record
        .added
        .iter()
        .map(|&node| OwnWrite::Inserted { node, parent })
        .chain(record.removed.iter().map(|&node| OwnWrite::Removed { node, parent }));
    let hits: Option<Vec<usize>> = expected
        .map(|write| ledger.iter().position(|entry| *entry == write))
        .collect();
    match hits {
        Some(mut hits) if !hits.is_empty() => {
            hits.sort_unstable();
            for index in hits.into_iter().rev() {
                ledger.swap_remove(index);
            }
            true
        }
        _ => false,
    }
}
