#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    match css::parse_selector(input) {
        Ok(list) => {
            let mut doc = dom::Document::new();
            let body = doc.body();
            let el = doc.create_element_with("div", &[("id", "x"), ("class", "a b")]);
            doc.append_child(body, el).expect("append");
            let _ = doc.query_first(&list);
        }
        Err(err) => assert!(err.position <= input.len(), "error position out of range: {err}"),
    }
});
