//! Container manager: the synthetic wrapper that marks where projected content lives.

use crate::config::PortalConfig;
use crate::host::{DomHost, DomQuery};
use core_types::PortalId;
use dom::DomError;
use html::{Node, NodeKey};
use std::fmt;

/// Placement of the container relative to the anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Position {
    /// Last child of the anchor.
    #[default]
    Append,
    /// First child of the anchor.
    Prepend,
    /// Sibling immediately preceding the anchor.
    Before,
    /// Sibling immediately following the anchor.
    After,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Append,
        Position::Prepend,
        Position::Before,
        Position::After,
    ];

    /// Whether the container goes inside the anchor rather than next to it.
    pub fn is_inside(self) -> bool {
        matches!(self, Position::Append | Position::Prepend)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Append => "append",
            Position::Prepend => "prepend",
            Position::Before => "before",
            Position::After => "after",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Position::ALL
            .into_iter()
            .find(|position| position.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sibling positions need a parent to insert into; inside positions never do.
pub fn can_host(dom: &dyn DomQuery, anchor: NodeKey, position: Position) -> bool {
    dom.exists(anchor) && (position.is_inside() || dom.parent(anchor).is_some())
}

/// Builds a detached, layout-transparent container holding `content`.
pub fn create<H: DomHost>(
    host: &mut H,
    config: &PortalConfig,
    owner: PortalId,
    content: &[Node],
) -> Result<NodeKey, DomError> {
    let owner = owner.0.to_string();
    let container = host.create_element(
        &config.container_tag,
        &[(config.container_marker.as_str(), owner.as_str()), ("style", "display: contents")],
    );
    project(host, container, content)?;
    Ok(container)
}

/// Replaces the container's children with fresh instances of `content`.
pub fn project<H: DomHost>(
    host: &mut H,
    container: NodeKey,
    content: &[Node],
) -> Result<(), DomError> {
    host.clear_children(container)?;
    for template in content {
        let node = host.instantiate(template)?;
        host.append_child(container, node)?;
    }
    Ok(())
}

/// Creates a container for `anchor` and inserts it at `position`.
///
/// Returns `None` without touching the document when the anchor cannot host
/// the position (a parentless anchor with `Before`/`After`).
pub fn materialize<H: DomHost>(
    host: &mut H,
    config: &PortalConfig,
    owner: PortalId,
    anchor: NodeKey,
    position: Position,
    content: &[Node],
) -> Result<Option<NodeKey>, DomError> {
    if !can_host(&*host, anchor, position) {
        return Ok(None);
    }
    let container = create(host, config, owner, content)?;
    place(host, container, anchor, position)?;
    log::debug!(
        target: "portal.container",
        "{owner} installed container {:?} ({position}) at anchor {:?}",
        container,
        anchor
    );
    Ok(Some(container))
}

fn place<H: DomHost>(
    host: &mut H,
    container: NodeKey,
    anchor: NodeKey,
    position: Position,
) -> Result<(), DomError> {
    match position {
        Position::Append => host.append_child(anchor, container),
        Position::Prepend => host.prepend_child(anchor, container),
        Position::Before => {
            let parent = host.parent(anchor).ok_or(DomError::InvalidParent(anchor))?;
            host.insert_before(parent, container, anchor)
        }
        Position::After => host.insert_after(anchor, container),
    }
}

/// Whether `container` still sits where `position` puts it relative to `anchor`.
///
/// Inside positions only require the anchor to be the parent. Sibling
/// positions require a shared parent and the correct side of the anchor, so
/// other nodes inserted between the two do not count as displacement.
pub fn is_positioned(
    dom: &dyn DomQuery,
    container: NodeKey,
    anchor: NodeKey,
    position: Position,
) -> bool {
    let Some(parent) = dom.parent(container) else {
        return false;
    };
    if position.is_inside() {
        return parent == anchor;
    }
    if dom.parent(anchor) != Some(parent) {
        return false;
    }
    let siblings = dom.children(parent);
    let index = |key: NodeKey| siblings.iter().position(|k| *k == key);
    match (index(container), index(anchor)) {
        (Some(c), Some(a)) if position == Position::Before => c < a,
        (Some(c), Some(a)) => c > a,
        _ => false,
    }
}

/// Detaches the container from wherever it currently is.
pub fn detach<H: DomHost>(host: &mut H, container: NodeKey) -> Result<(), DomError> {
    if !host.exists(container) {
        return Ok(());
    }
    host.remove(container)
}

/// Frees a detached container and everything projected into it.
pub fn dispose<H: DomHost>(host: &mut H, container: NodeKey) -> Result<(), DomError> {
    if !host.exists(container) {
        return Ok(());
    }
    host.discard(container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Document;
    use html::parse_fragment;

    fn anchor_with_children() -> (Document, NodeKey) {
        let mut doc = Document::new();
        let body = doc.body();
        let anchor = doc.create_element_with("ul", &[("id", "list")]);
        doc.append_child(body, anchor).unwrap();
        for _ in 0..2 {
            let item = doc.create_element("li");
            doc.append_child(anchor, item).unwrap();
        }
        (doc, anchor)
    }

    #[test]
    fn container_is_marked_and_transparent() {
        let (mut doc, anchor) = anchor_with_children();
        let content = parse_fragment("<b>hi</b>").unwrap();
        let config = PortalConfig::default();
        let owner = PortalId(7);
        let container = materialize(&mut doc, &config, owner, anchor, Position::Append, &content)
            .unwrap()
            .unwrap();
        assert_eq!(doc.local_name(container), Some("div"));
        assert_eq!(doc.attribute(container, "data-portal-container"), Some("7"));
        assert_eq!(doc.attribute(container, "style"), Some("display: contents"));
        assert_eq!(doc.children(container).len(), 1);
        assert_eq!(doc.last_child(anchor), Some(container));
    }

    #[test]
    fn each_position_lands_where_expected() {
        for position in Position::ALL {
            let (mut doc, anchor) = anchor_with_children();
            let config = PortalConfig::default();
            let container = materialize(&mut doc, &config, PortalId(1), anchor, position, &[])
                .unwrap()
                .unwrap();
            let expected = match position {
                Position::Append => doc.last_child(anchor),
                Position::Prepend => doc.first_child(anchor),
                Position::Before => doc.previous_sibling(anchor),
                Position::After => doc.next_sibling(anchor),
            };
            assert_eq!(expected, Some(container), "{position}");
            assert!(is_positioned(&doc, container, anchor, position));
        }
    }

    #[test]
    fn parentless_anchor_only_hosts_inside_positions() {
        let mut doc = Document::new();
        let loose = doc.create_element("div");
        assert!(can_host(&doc, loose, Position::Append));
        assert!(can_host(&doc, loose, Position::Prepend));
        assert!(!can_host(&doc, loose, Position::Before));
        let config = PortalConfig::default();
        let none =
            materialize(&mut doc, &config, PortalId(1), loose, Position::After, &[]).unwrap();
        assert_eq!(none, None);
        assert!(doc.children(loose).is_empty());
    }

    #[test]
    fn sibling_check_is_side_based() {
        let (mut doc, anchor) = anchor_with_children();
        let config = PortalConfig::default();
        let container = materialize(&mut doc, &config, PortalId(1), anchor, Position::After, &[])
            .unwrap()
            .unwrap();
        let intruder = doc.create_element("aside");
        doc.insert_after(anchor, intruder).unwrap();
        assert!(is_positioned(&doc, container, anchor, Position::After));
        assert!(!is_positioned(&doc, container, anchor, Position::Before));

        detach(&mut doc, container).unwrap();
        assert!(!is_positioned(&doc, container, anchor, Position::After));
        dispose(&mut doc, container).unwrap();
        assert!(!doc.exists(container));
    }

    #[test]
    fn position_names_round_trip() {
        assert_eq!(Position::from_name("Before"), Some(Position::Before));
        assert_eq!(Position::from_name("sideways"), None);
        assert_eq!(Position::default(), Position::Append);
    }
}
