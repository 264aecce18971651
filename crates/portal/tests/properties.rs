mod common;

use common::{Event, Events, element_by_id, insert_markup};
use html::dom_snapshot::assert_snapshot;
use html::traverse::{find_node_by_key, text_content};
use portal::{
    AnchorSpec, ElementSlot, NonSelectorPolicy, PortalConfig, PortalProps, PortalRoot, Position,
};

#[test]
fn unresolvable_anchor_renders_nothing() {
    let slot = ElementSlot::new();
    let specs = [
        AnchorSpec::selector("#missing"),
        AnchorSpec::Element(None),
        AnchorSpec::resolver(|_| Ok(None)),
        AnchorSpec::external(&slot),
    ];
    for spec in specs {
        let mut root = PortalRoot::new();
        let events = Events::new();
        let container_ref = ElementSlot::new();
        let body = root.document().body();
        let before = root.document().mutation_count();

        let id = root
            .mount(events.record(PortalProps::new(spec.clone()).container_ref(&container_ref)))
            .unwrap();
        root.flush().unwrap();

        assert_eq!(root.container(id), None, "{spec:?}");
        assert!(events.all().is_empty(), "{spec:?}");
        assert_eq!(container_ref.get(), None);
        assert!(root.document().children(body).is_empty());
        assert_eq!(root.document().mutation_count(), before);
    }
}

#[test]
fn late_arrival_mounts_once_with_new_element() {
    let mut root = PortalRoot::new();
    let events = Events::new();
    let id = root.mount(events.record(PortalProps::new(".late"))).unwrap();
    root.flush().unwrap();
    assert_eq!(root.container(id), None);

    let body = root.document().body();
    insert_markup(root.document_mut(), body, "<section><div class=\"late\"></div></section>");
    root.flush().unwrap();

    let doc = root.document();
    let late = doc.query_selector(".late").unwrap().unwrap();
    let container = root.container(id).unwrap();
    assert_eq!(root.anchor(id), Some(late));
    assert_eq!(doc.parent(container), Some(late));
    assert_eq!(events.all(), vec![Event::Mount(late, container)]);

    root.flush().unwrap();
    assert_eq!(events.mounts(), 1);
}

#[test]
fn removing_anchor_unmounts_once() {
    let mut root = PortalRoot::new();
    let body = root.document().body();
    insert_markup(root.document_mut(), body, "<div id=\"a\"></div>");
    let anchor = element_by_id(root.document(), "a");

    for spec in [AnchorSpec::selector("#a"), AnchorSpec::element(anchor)] {
        if !root.document().is_connected(anchor) {
            root.document_mut().append_child(body, anchor).unwrap();
        }
        let events = Events::new();
        let container_ref = ElementSlot::new();
        let id = root
            .mount(events.record(PortalProps::new(spec.clone()).container_ref(&container_ref)))
            .unwrap();
        root.flush().unwrap();
        let container = root.container(id).unwrap();
        assert_eq!(container_ref.get(), Some(container));

        root.document_mut().remove(anchor).unwrap();
        root.flush().unwrap();

        assert_eq!(root.container(id), None, "{spec:?}");
        assert!(!root.document().exists(container));
        assert_eq!(container_ref.get(), None);
        assert_eq!(
            events.all(),
            vec![Event::Mount(anchor, container), Event::Unmount(anchor, container)],
            "{spec:?}"
        );

        root.flush().unwrap();
        assert_eq!(events.unmounts(), 1);
        root.unmount(id).unwrap();
        assert_eq!(events.unmounts(), 1);
    }
}

#[test]
fn parentless_anchor_only_supports_inside_positions() {
    for position in Position::ALL {
        let mut root = PortalRoot::new();
        let loose = root.document_mut().create_element("div");
        let events = Events::new();
        let id = root
            .mount(events.record(PortalProps::new(loose).position(position)))
            .unwrap();
        root.flush().unwrap();

        match position {
            Position::Before | Position::After => {
                assert_eq!(root.container(id), None, "{position}");
                assert!(events.all().is_empty());
            }
            Position::Append | Position::Prepend => {
                let container = root.container(id).unwrap();
                assert_eq!(root.document().parent(container), Some(loose), "{position}");
                assert_eq!(events.all(), vec![Event::Mount(loose, container)]);
            }
        }
    }
}

#[test]
fn repeated_resolution_is_idempotent() {
    let mut root = PortalRoot::new();
    let body = root.document().body();
    insert_markup(root.document_mut(), body, "<ul id=\"list\"><li>one</li></ul>");
    let events = Events::new();

    for position in Position::ALL {
        let id = root
            .mount(events.record(PortalProps::new("#list").position(position)))
            .unwrap();
        root.flush().unwrap();
        let container = root.container(id).unwrap();
        let before = root.document().mutation_count();

        assert!(!root.resolve(id).unwrap());
        assert!(!root.resolve(id).unwrap());
        let stats = root.flush().unwrap();

        assert_eq!(root.document().mutation_count(), before, "{position}");
        assert_eq!(root.container(id), Some(container));
        assert_eq!(stats.batches, 0);
        root.unmount(id).unwrap();
    }
    assert_eq!(events.mounts(), 4);
    assert_eq!(events.unmounts(), 4);
}

#[test]
fn own_container_writes_do_not_loop() {
    let mut root = PortalRoot::new();
    let events = Events::new();
    let id = root
        .mount(events.record(PortalProps::new("#target").markup("<p>hi</p>").unwrap()))
        .unwrap();
    assert_eq!(root.resolution_passes(id), Some(1));

    let body = root.document().body();
    insert_markup(root.document_mut(), body, "<div id=\"target\"></div>");
    let stats = root.flush().unwrap();

    assert_eq!(stats.passes, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.rounds, 2);
    assert_eq!(root.resolution_passes(id), Some(2));
    assert_eq!(events.mounts(), 1);
}

#[test]
fn own_writes_do_not_loop_when_reacting_to_everything() {
    let config =
        PortalConfig::default().with_non_selector_policy(NonSelectorPolicy::AnyExternalMutation);
    let mut root = PortalRoot::with_config(config);
    let body = root.document().body();
    insert_markup(root.document_mut(), body, "<main></main>");
    let main = root.document().first_child(body).unwrap();
    let id = root.mount(PortalProps::new(main)).unwrap();
    root.flush().unwrap();
    let passes = root.resolution_passes(id).unwrap();

    insert_markup(root.document_mut(), body, "<footer></footer>");
    let stats = root.flush().unwrap();
    assert_eq!(stats.passes, 1);
    assert_eq!(root.resolution_passes(id), Some(passes + 1));
}

#[test]
fn two_instances_on_one_anchor_stay_independent() {
    let mut root = PortalRoot::new();
    let body = root.document().body();
    insert_markup(root.document_mut(), body, "<nav id=\"shared\"><a>home</a></nav>");
    let anchor = element_by_id(root.document(), "shared");

    let inside = Events::new();
    let beside = Events::new();
    let first = root
        .mount(inside.record(PortalProps::new("#shared").position(Position::Append)))
        .unwrap();
    let second = root
        .mount(beside.record(PortalProps::new("#shared").position(Position::Before)))
        .unwrap();
    let stats = root.flush().unwrap();
    assert_eq!(stats.passes, 0);

    let first_container = root.container(first).unwrap();
    let second_container = root.container(second).unwrap();
    assert_ne!(first_container, second_container);
    assert_eq!(root.document().last_child(anchor), Some(first_container));
    assert_eq!(root.document().previous_sibling(anchor), Some(second_container));

    root.unmount(first).unwrap();
    root.flush().unwrap();
    assert_eq!(
        inside.all(),
        vec![Event::Mount(anchor, first_container), Event::Unmount(anchor, first_container)]
    );
    assert_eq!(beside.all(), vec![Event::Mount(anchor, second_container)]);
    assert_eq!(root.container(second), Some(second_container));
    assert_eq!(root.document().previous_sibling(anchor), Some(second_container));
}

#[test]
fn same_side_instances_settle_under_any_mutation_policy() {
    let config =
        PortalConfig::default().with_non_selector_policy(NonSelectorPolicy::AnyExternalMutation);
    let mut root = PortalRoot::with_config(config);
    let body = root.document().body();
    insert_markup(root.document_mut(), body, "<div id=\"shared\"></div>");
    let anchor = element_by_id(root.document(), "shared");

    let a = root.mount(PortalProps::new(anchor).position(Position::After)).unwrap();
    let b = root.mount(PortalProps::new(anchor).position(Position::After)).unwrap();
    let stats = root.flush().unwrap();

    let (ca, cb) = (root.container(a).unwrap(), root.container(b).unwrap());
    assert_eq!(root.document().children(body), &[anchor, cb, ca]);
    assert!(stats.rounds <= 3);
}

#[test]
fn target_scenario() {
    let mut root = PortalRoot::new();
    let events = Events::new();
    let props = PortalProps::new("#target")
        .markup("<p class=\"projected\">hello</p>")
        .unwrap();
    let id = root.mount(events.record(props)).unwrap();
    root.flush().unwrap();
    let body = root.document().body();
    assert!(root.document().children(body).is_empty());
    assert_eq!(root.container(id), None);
    assert!(events.all().is_empty());

    insert_markup(root.document_mut(), body, "<div id=\"target\"><span>X</span></div>");
    root.flush().unwrap();

    let target = element_by_id(root.document(), "target");
    let container = root.container(id).unwrap();
    assert_eq!(root.document().parent(container), Some(target));
    assert_eq!(events.all(), vec![Event::Mount(target, container)]);
    let tree = root.document().materialize(body).unwrap();
    let mounted = find_node_by_key(&tree, container).unwrap();
    assert_eq!(text_content(mounted), "hello");
    assert_snapshot(
        &tree,
        r#"
        <body>
          <div id="target">
            <span>
              "X"
            <div data-portal-container="1" style="display: contents">
              <p class="projected">
                "hello"
        "#,
    );

    root.document_mut().remove(target).unwrap();
    root.flush().unwrap();
    assert_eq!(root.container(id), None);
    assert!(!root.document().exists(container));
    assert_eq!(events.unmounts(), 1);
    assert_eq!(
        events.all(),
        vec![Event::Mount(target, container), Event::Unmount(target, container)]
    );
}
