//! Fuzz target for property path resolution.
//!
//! Input is split at the first newline: a JSON document, then a path. Resolution must never
//! panic, whatever the path looks like.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_path_resolver
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (doc, path) = text.split_once('\n').unwrap_or((text, ""));
    let doc: serde_json::Value = serde_json::from_str(doc).unwrap_or(serde_json::Value::Null);

    let resolved = stepguard_domain::resolve(&doc, path);
    let looked_up = stepguard_domain::path::lookup(&doc, path);
    assert_eq!(resolved.found, looked_up.is_some());
});
