//! Evaluation of a single typed rule against a resolved property.
//!
//! Every failure mode (type mismatch, bad pattern, unsupported operator) is reported as an
//! unsatisfied rule. Nothing here panics or returns an error to the caller.

use crate::model::{Operator, RuleKind, ValidationRule};
use crate::path::Resolved;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use stepguard_types::{ErrorKind, StructuredValue};

/// An unsatisfied rule.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleFailure {
    pub rule: String,
    pub kind: ErrorKind,
    pub message: String,
    pub expected: StructuredValue,
    pub actual: StructuredValue,
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Predicate backing a `custom` rule: `Err(detail)` fails the rule.
pub type CustomPredicate = dyn Fn(&Resolved, &ValidationRule) -> Result<(), String> + Send + Sync;

/// Registry of `custom` rule predicates keyed by rule name.
#[derive(Clone, Default)]
pub struct CustomRules {
    predicates: BTreeMap<String, Arc<CustomPredicate>>,
}

impl CustomRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, rule_name: &str, predicate: F)
    where
        F: Fn(&Resolved, &ValidationRule) -> Result<(), String> + Send + Sync + 'static,
    {
        self.predicates
            .insert(rule_name.to_string(), Arc::new(predicate));
    }

    pub fn get(&self, rule_name: &str) -> Option<&Arc<CustomPredicate>> {
        self.predicates.get(rule_name)
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for CustomRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.predicates.keys()).finish()
    }
}

/// Rule evaluator with its `custom` predicate registry.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    custom: CustomRules,
}

impl Evaluator {
    pub fn new(custom: CustomRules) -> Self {
        Self { custom }
    }

    pub fn evaluate(&self, actual: &Resolved, rule: &ValidationRule) -> Option<RuleFailure> {
        match rule.kind {
            RuleKind::Exists => check_exists(actual, rule),
            RuleKind::Property => check_property(&actual.value, rule),
            RuleKind::Count => check_count(&actual.value, rule),
            RuleKind::Custom => {
                let predicate = self.custom.get(&rule.name)?;
                let detail = predicate(actual, rule).err()?;
                Some(failure(
                    rule,
                    ErrorKind::PropertyMismatch,
                    detail,
                    &actual.value,
                ))
            }
        }
    }
}

/// Evaluate `rule` with no custom predicates registered.
pub fn evaluate(actual: &Resolved, rule: &ValidationRule) -> Option<RuleFailure> {
    Evaluator::default().evaluate(actual, rule)
}

fn check_exists(actual: &Resolved, rule: &ValidationRule) -> Option<RuleFailure> {
    if actual.found {
        return None;
    }
    let message = if rule.error_message.is_empty() {
        format!("{}: property '{}' not found", rule.name, rule.property)
    } else {
        rule.error_message.clone()
    };
    Some(RuleFailure {
        rule: rule.name.clone(),
        kind: ErrorKind::PropertyMismatch,
        message,
        expected: rule.expected.clone(),
        actual: Value::Null,
    })
}

fn check_property(actual: &StructuredValue, rule: &ValidationRule) -> Option<RuleFailure> {
    let expected = &rule.expected;
    let mismatch = |detail: String| Some(failure(rule, ErrorKind::PropertyMismatch, detail, actual));

    // A property rule without an operator has nothing to compare.
    let Some(op) = rule.operator else {
        return None;
    };
    match op {
        Operator::Eq => {
            if values_equal(actual, expected) {
                None
            } else {
                mismatch(format!("expected {}, got {}", plain(expected), plain(actual)))
            }
        }
        // Structural only: 3 and 3.0 are "not equal" here.
        Operator::Ne => {
            if actual == expected {
                mismatch(format!("value should not be {}", plain(expected)))
            } else {
                None
            }
        }
        op @ (Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le) => {
            if compare_numbers(actual, expected, op) {
                None
            } else {
                mismatch(format!(
                    "{} should be {} {}",
                    plain(actual),
                    relation(op),
                    plain(expected)
                ))
            }
        }
        Operator::Contains => {
            if plain(actual).contains(&plain(expected)) {
                None
            } else {
                mismatch(format!(
                    "{} should contain {}",
                    plain(actual),
                    plain(expected)
                ))
            }
        }
        Operator::Regex => {
            let pattern = plain(expected);
            match regex::Regex::new(&pattern) {
                Ok(re) if re.is_match(&plain(actual)) => None,
                Ok(_) => mismatch(format!(
                    "{} does not match pattern {}",
                    plain(actual),
                    pattern
                )),
                Err(err) => Some(failure(
                    rule,
                    ErrorKind::ConfigurationInvalid,
                    format!("invalid pattern {pattern}: {err}"),
                    actual,
                )),
            }
        }
    }
}

fn check_count(actual: &StructuredValue, rule: &ValidationRule) -> Option<RuleFailure> {
    let count = match actual {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => {
            return Some(failure(
                rule,
                ErrorKind::PropertyMismatch,
                "cannot count non-collection type".to_string(),
                actual,
            ));
        }
    };
    let count = i64::try_from(count).unwrap_or(i64::MAX);

    let Some(expected) = rule.expected.as_i64() else {
        return Some(failure(
            rule,
            ErrorKind::ConfigurationInvalid,
            format!(
                "expected count must be an integer, got {}",
                plain(&rule.expected)
            ),
            actual,
        ));
    };

    let detail = match rule.count_operator() {
        Operator::Eq if count != expected => format!("expected count {expected}, got {count}"),
        Operator::Ne if count == expected => format!("count should not be {expected}"),
        op @ Operator::Gt if count <= expected => count_detail(count, op, expected),
        op @ Operator::Lt if count >= expected => count_detail(count, op, expected),
        op @ Operator::Ge if count < expected => count_detail(count, op, expected),
        op @ Operator::Le if count > expected => count_detail(count, op, expected),
        op @ (Operator::Contains | Operator::Regex) => {
            return Some(failure(
                rule,
                ErrorKind::ConfigurationInvalid,
                format!("unsupported operator for count: {op}"),
                actual,
            ));
        }
        _ => return None,
    };
    Some(failure(
        rule,
        ErrorKind::PropertyMismatch,
        detail,
        &Value::from(count),
    ))
}

fn count_detail(count: i64, op: Operator, expected: i64) -> String {
    format!("count {count} should be {} {expected}", relation(op))
}

fn failure(
    rule: &ValidationRule,
    kind: ErrorKind,
    detail: String,
    actual: &StructuredValue,
) -> RuleFailure {
    let prefix = if rule.error_message.is_empty() {
        &rule.name
    } else {
        &rule.error_message
    };
    RuleFailure {
        rule: rule.name.clone(),
        kind,
        message: format!("{prefix}: {detail}"),
        expected: rule.expected.clone(),
        actual: actual.clone(),
    }
}

/// Numbers compare by value across integer/float representations; everything else structurally.
pub fn values_equal(actual: &StructuredValue, expected: &StructuredValue) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(e)) => a == e,
        _ => actual == expected,
    }
}

fn compare_numbers(actual: &StructuredValue, expected: &StructuredValue, op: Operator) -> bool {
    let (Some(a), Some(e)) = (actual.as_f64(), expected.as_f64()) else {
        return false;
    };
    match op {
        Operator::Gt => a > e,
        Operator::Lt => a < e,
        Operator::Ge => a >= e,
        Operator::Le => a <= e,
        _ => false,
    }
}

fn relation(op: Operator) -> &'static str {
    match op {
        Operator::Gt => "greater than",
        Operator::Lt => "less than",
        Operator::Ge => "greater than or equal to",
        Operator::Le => "less than or equal to",
        _ => "compared with",
    }
}

/// Strings render raw, everything else as compact JSON.
pub fn plain(value: &StructuredValue) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
