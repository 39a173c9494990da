//! Fuzz target for rule file parsing and evaluation.
//!
//! Every rule that parses is evaluated against a fixed resource document; neither step may
//! panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_rule_yaml
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(rules) = stepguard_catalog::parse::rules(text) else {
        return;
    };

    let doc = json!({
        "CidrBlock": "10.0.0.0/16",
        "EnableDnsHostnames": true,
        "Tags": [{ "Key": "Name", "Value": "sbcntr-vpc" }],
        "Ports": [80, 443.0],
        "Nested": { "a": { "b": null } }
    });
    for rule in &rules {
        let actual = stepguard_domain::resolve(&doc, &rule.property);
        let _ = stepguard_domain::evaluate(&actual, rule);
    }
});
