mod common;

use common::{element_by_id, insert_markup};
use html::NodeKey;
use portal::{PortalProps, PortalRoot, Position};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Fixture {
    markup: String,
    #[serde(rename = "case")]
    cases: Vec<PositionCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Scope {
    Anchor,
    Parent,
}

#[derive(Debug, Deserialize)]
struct PositionCase {
    position: String,
    scope: Scope,
    children: Vec<String>,
}

fn load_fixture() -> Fixture {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/positions.toml");
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {path:?}: {err}"));
    toml::from_str(&text).unwrap_or_else(|err| panic!("failed to parse {path:?}: {err}"))
}

fn label(root: &PortalRoot, key: NodeKey) -> String {
    let doc = root.document();
    if doc.attribute(key, "data-portal-container").is_some() {
        return "portal".to_string();
    }
    doc.attribute(key, "id").unwrap_or("?").to_string()
}

#[test]
fn positions_match_fixture() {
    let fixture = load_fixture();
    assert_eq!(fixture.cases.len(), Position::ALL.len());

    for case in &fixture.cases {
        let position = Position::from_name(&case.position)
            .unwrap_or_else(|| panic!("unknown position {:?}", case.position));
        let mut root = PortalRoot::new();
        let body = root.document().body();
        insert_markup(root.document_mut(), body, &fixture.markup);
        let anchor = element_by_id(root.document(), "anchor");

        let id = root.mount(PortalProps::new("#anchor").position(position)).unwrap();
        root.flush().unwrap();
        assert!(root.container(id).is_some(), "{position}");

        let parent = match case.scope {
            Scope::Anchor => anchor,
            Scope::Parent => body,
        };
        let children: Vec<String> = root
            .document()
            .children(parent)
            .iter()
            .map(|key| label(&root, *key))
            .collect();
        assert_eq!(children, case.children, "{position}");
    }
}

#[test]
fn changing_position_moves_container() {
    let fixture = load_fixture();
    let mut root = PortalRoot::new();
    let body = root.document().body();
    insert_markup(root.document_mut(), body, &fixture.markup);
    let anchor = element_by_id(root.document(), "anchor");

    let id = root.mount(PortalProps::new("#anchor")).unwrap();
    for position in [Position::Before, Position::Prepend, Position::After, Position::Append] {
        let previous = root.container(id).unwrap();
        assert!(root.update(id, PortalProps::new("#anchor").position(position)).unwrap());
        root.flush().unwrap();
        let current = root.container(id).unwrap();
        assert_ne!(previous, current);
        assert!(!root.document().exists(previous));
        let placed = match position {
            Position::Append => root.document().last_child(anchor),
            Position::Prepend => root.document().first_child(anchor),
            Position::Before => root.document().previous_sibling(anchor),
            Position::After => root.document().next_sibling(anchor),
        };
        assert_eq!(placed, Some(current), "{position}");
    }
}
