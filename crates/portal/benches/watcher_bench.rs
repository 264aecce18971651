use criterion::{Criterion, black_box, criterion_group, criterion_main};
use css::parse_selector;
use dom::{Document, ObserveOptions};
use portal::{MutationWatcher, PortalConfig, PortalProps, PortalRoot, WatchState};

const BATCH_RECORDS: usize = 256;

/// A body with an anchor and a batch of unrelated insertions queued for one observer.
fn noisy_batch() -> (Document, Vec<dom::MutationRecord>, html::NodeKey) {
    let mut doc = Document::new();
    let body = doc.body();
    let anchor = doc.create_element_with("div", &[("id", "anchor")]);
    doc.append_child(body, anchor).unwrap();
    let observer = doc.observe(body, ObserveOptions::default()).unwrap();
    for i in 0..BATCH_RECORDS {
        let index = i.to_string();
        let row = doc.create_element_with("li", &[("data-i", index.as_str())]);
        let cell = doc.create_element("span");
        doc.append_child(row, cell).unwrap();
        doc.append_child(body, row).unwrap();
    }
    let records = doc.take_records(observer).unwrap();
    (doc, records, anchor)
}

fn bench_classify_selector(c: &mut Criterion) {
    let (doc, records, anchor) = noisy_batch();
    let list = parse_selector("#late, .slot > span").unwrap();
    let config = PortalConfig::default();
    let state = WatchState {
        anchor: Some(anchor),
        container: None,
        selector: Some(&list),
    };
    c.bench_function("bench_classify_selector", |b| {
        let mut watcher = MutationWatcher::detached();
        b.iter(|| black_box(watcher.classify(black_box(&records), &state, &config, &doc)));
    });
}

fn bench_classify_element(c: &mut Criterion) {
    let (doc, records, anchor) = noisy_batch();
    let config = PortalConfig::default();
    let state = WatchState {
        anchor: Some(anchor),
        ..WatchState::default()
    };
    c.bench_function("bench_classify_element", |b| {
        let mut watcher = MutationWatcher::detached();
        b.iter(|| black_box(watcher.classify(black_box(&records), &state, &config, &doc)));
    });
}

fn bench_flush_many_portals(c: &mut Criterion) {
    c.bench_function("bench_flush_many_portals", |b| {
        b.iter(|| {
            let mut root = PortalRoot::new();
            for i in 0..32 {
                let selector = format!("#slot-{i}");
                root.mount(PortalProps::new(selector.as_str())).unwrap();
            }
            let body = root.document().body();
            for i in 0..32 {
                let id = format!("slot-{i}");
                let slot = root.document_mut().create_element_with("div", &[("id", id.as_str())]);
                root.document_mut().append_child(body, slot).unwrap();
            }
            black_box(root.flush().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_classify_selector,
    bench_classify_element,
    bench_flush_many_portals
);
criterion_main!(benches);
