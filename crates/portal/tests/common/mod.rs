#![allow(dead_code)]

use dom::Document;
use html::{NodeKey, parse_fragment};
use portal::PortalProps;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Mount(NodeKey, NodeKey),
    Unmount(NodeKey, NodeKey),
}

/// Shared log of lifecycle callbacks for one portal instance.
#[derive(Clone, Default)]
pub struct Events(Rc<RefCell<Vec<Event>>>);

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires both lifecycle callbacks of `props` into this log.
    pub fn record(&self, props: PortalProps) -> PortalProps {
        let mounts = Rc::clone(&self.0);
        let unmounts = Rc::clone(&self.0);
        props
            .on_mount(move |anchor, container| {
                mounts.borrow_mut().push(Event::Mount(anchor, container))
            })
            .on_unmount(move |anchor, container| {
                unmounts.borrow_mut().push(Event::Unmount(anchor, container))
            })
    }

    pub fn all(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn mounts(&self) -> usize {
        self.0.borrow().iter().filter(|e| matches!(e, Event::Mount(..))).count()
    }

    pub fn unmounts(&self) -> usize {
        self.0.borrow().iter().filter(|e| matches!(e, Event::Unmount(..))).count()
    }
}

/// Parses `markup` and appends every root under `parent`, returning the roots.
pub fn insert_markup(doc: &mut Document, parent: NodeKey, markup: &str) -> Vec<NodeKey> {
    let nodes = parse_fragment(markup).unwrap_or_else(|err| panic!("bad markup {markup:?}: {err}"));
    nodes
        .iter()
        .map(|node| {
            let key = doc.instantiate(node).expect("instantiate");
            doc.append_child(parent, key).expect("append");
            key
        })
        .collect()
}

pub fn element_by_id(doc: &Document, id: &str) -> NodeKey {
    doc.get_element_by_id(id)
        .unwrap_or_else(|| panic!("no element with id {id:?}"))
}
