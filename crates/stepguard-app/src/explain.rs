//! The `explain` use case: look up error kind and rule kind documentation.

use stepguard_types::explain::{self, Explanation};

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    /// Found an explanation for the identifier.
    Found(Explanation),
    /// Unknown identifier; includes available error codes and rule kinds.
    NotFound {
        identifier: String,
        available_codes: &'static [&'static str],
        available_rule_kinds: &'static [&'static str],
    },
}

/// Look up an explanation for an error code or rule kind.
pub fn run_explain(identifier: &str) -> ExplainOutput {
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_codes: explain::all_error_codes(),
            available_rule_kinds: explain::all_rule_kinds(),
        },
    }
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();

    out.push_str(exp.title);
    out.push('\n');
    out.push_str(&"=".repeat(exp.title.len()));
    out.push_str("\n\n");
    out.push_str(exp.description);
    out.push_str("\n\n");
    out.push_str("Remediation\n");
    out.push_str("-----------\n");
    out.push_str(exp.remediation);
    out.push_str("\n\n");
    out.push_str("Examples\n");
    out.push_str("--------\n\n");
    out.push_str("Before:\n");
    out.push_str("```yaml\n");
    out.push_str(exp.examples.before);
    out.push('\n');
    out.push_str("```\n\n");
    out.push_str("After:\n");
    out.push_str("```yaml\n");
    out.push_str(exp.examples.after);
    out.push('\n');
    out.push_str("```\n");

    out
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(identifier: &str, codes: &[&'static str], rule_kinds: &[&'static str]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown error code or rule kind: {identifier}\n\n"));
    out.push_str("Available error codes:\n");
    for code in codes {
        out.push_str(&format!("  - {code}\n"));
    }
    out.push_str("\nAvailable rule kinds:\n");
    for kind in rule_kinds {
        out.push_str(&format!("  - {kind}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explains_error_codes_and_rule_kinds() {
        for id in ["resource_not_found", "count"] {
            let ExplainOutput::Found(exp) = run_explain(id) else {
                panic!("{id} should be explained");
            };
            let text = format_explanation(&exp);
            assert!(text.starts_with(exp.title));
            assert!(text.contains("Remediation\n-----------\n"));
            assert!(text.contains("```yaml\n"));
        }
    }

    #[test]
    fn unknown_identifier_lists_alternatives() {
        let ExplainOutput::NotFound {
            identifier,
            available_codes,
            available_rule_kinds,
        } = run_explain("bogus")
        else {
            panic!("bogus should not be explained");
        };
        let text = format_not_found(&identifier, available_codes, available_rule_kinds);
        assert!(text.starts_with("Unknown error code or rule kind: bogus\n"));
        assert!(text.contains("  - permission_denied\n"));
        assert!(text.contains("  - exists\n"));
    }
}
