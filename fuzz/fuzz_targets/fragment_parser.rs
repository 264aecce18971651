#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(nodes) = html::parse_fragment(input) else {
        return;
    };
    // Whatever parses must instantiate into a live document.
    let mut doc = dom::Document::new();
    let body = doc.body();
    for node in &nodes {
        let key = doc.instantiate(node).expect("instantiate parsed fragment");
        doc.append_child(body, key).expect("append parsed fragment");
    }
});
