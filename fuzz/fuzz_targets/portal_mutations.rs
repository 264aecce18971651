#![no_main]

//! Random structural edits against mounted portals; every flush must settle
//! and each instance must hold at most one attached container.

use libfuzzer_sys::fuzz_target;
use portal::{PortalProps, PortalRoot, Position};

const SELECTORS: [&str; 4] = ["#a", ".b", "div > span", "section .b"];
const TAGS: [&str; 4] = ["div", "span", "section", "p"];

fuzz_target!(|data: &[u8]| {
    let mut root = PortalRoot::new();
    let body = root.document().body();
    let mut ids = Vec::new();
    for (i, selector) in SELECTORS.iter().enumerate() {
        let props = PortalProps::new(*selector).position(Position::ALL[i % Position::ALL.len()]);
        ids.push(root.mount(props).expect("mount"));
    }

    let mut nodes = vec![body];
    for op in data.chunks(3) {
        let [kind, a, b] = [op[0], *op.get(1).unwrap_or(&0), *op.get(2).unwrap_or(&0)];
        let doc = root.document_mut();
        let pick = |n: u8, nodes: &[html::NodeKey]| nodes[n as usize % nodes.len()];
        match kind % 4 {
            0 => {
                let tag = TAGS[a as usize % TAGS.len()];
                let el = match b % 3 {
                    0 => doc.create_element_with(tag, &[("id", "a")]),
                    1 => doc.create_element_with(tag, &[("class", "b")]),
                    _ => doc.create_element(tag),
                };
                let parent = pick(b, &nodes);
                if doc.exists(parent) && doc.is_element(parent) {
                    doc.append_child(parent, el).expect("append");
                }
                nodes.push(el);
            }
            1 => {
                let node = pick(a, &nodes);
                if node != body && doc.exists(node) {
                    doc.remove(node).expect("remove");
                }
            }
            2 => {
                let (parent, child) = (pick(a, &nodes), pick(b, &nodes));
                let movable = child != body && doc.exists(parent) && doc.exists(child);
                if movable && doc.is_element(parent) && !doc.contains(child, parent) {
                    doc.append_child(parent, child).expect("move");
                }
            }
            _ => {
                root.flush().expect("flush settles");
            }
        }
    }
    root.flush().expect("flush settles");

    for id in ids {
        if let Some(container) = root.container(id) {
            assert!(root.document().exists(container));
        }
        root.unmount(id).expect("unmount");
    }
});
