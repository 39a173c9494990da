//! Resource-level aggregation: existence plus the outcome of every requested rule.

use crate::model::{ResourceDefinition, RuleSeverity, ValidationRule};
use crate::path::resolve_in;
use crate::rules::{Evaluator, plain};
use std::fmt;
use stepguard_types::{ErrorKind, Mapping, ResourceResult, ResourceStatus};
use tracing::{debug, warn};

/// Build the result for one declared resource.
///
/// `state` is `None` when the resource does not exist; nothing is evaluated in that case.
/// Each name in `def.rule_names` applies every rule in `rules` carrying that name, in order.
pub fn aggregate_resource(
    def: &ResourceDefinition,
    state: Option<Mapping>,
    rules: &[ValidationRule],
    evaluator: &Evaluator,
) -> ResourceResult {
    let mut result =
        ResourceResult::not_found(&def.resource_type, def.lookup_key(), def.display_name());

    let Some(props) = state else {
        debug!(
            resource_type = %def.resource_type,
            identifier = %def.lookup_key(),
            "resource not found"
        );
        return result;
    };

    result.status = ResourceStatus::Exists;

    for requested in &def.rule_names {
        for rule in rules.iter().filter(|r| &r.name == requested) {
            result
                .expected
                .insert(rule.property.clone(), rule.expected.clone());

            let actual = resolve_in(&props, &rule.property);
            let Some(failure) = evaluator.evaluate(&actual, rule) else {
                continue;
            };
            if failure.kind == ErrorKind::ConfigurationInvalid {
                // The rule itself is broken, not the resource.
                warn!(
                    resource_type = %def.resource_type,
                    identifier = %def.lookup_key(),
                    rule = %rule.name,
                    kind = failure.kind.code(),
                    "invalid rule: {failure}"
                );
            } else {
                debug!(
                    resource_type = %def.resource_type,
                    identifier = %def.lookup_key(),
                    rule = %rule.name,
                    severity = ?rule.severity,
                    kind = failure.kind.code(),
                    expected = %plain(&failure.expected),
                    actual = %plain(&failure.actual),
                    "{failure}"
                );
            }
            match rule.severity {
                RuleSeverity::Error => {
                    result.status = ResourceStatus::Misconfigured;
                    result.errors.push(failure.message);
                }
                RuleSeverity::Warning => result.warnings.push(failure.message),
            }
        }
    }

    result.actual = props;
    result
}

/// Result for a resource whose existence check could not be completed.
pub fn unverified_resource(def: &ResourceDefinition, reason: impl fmt::Display) -> ResourceResult {
    let mut result =
        ResourceResult::not_found(&def.resource_type, def.lookup_key(), def.display_name());
    result
        .errors
        .push(format!("failed to check resource: {reason}"));
    result
}
