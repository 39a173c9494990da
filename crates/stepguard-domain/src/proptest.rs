//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - path resolution over generated documents
//! - rule evaluation never panicking
//! - deterministic resource aggregation

use crate::model::{Operator, ResourceDefinition, RuleKind, RuleSeverity, ValidationRule};
use crate::path::{Resolved, resolve};
use crate::resource::aggregate_resource;
use crate::rules::{Evaluator, evaluate};
use proptest::prelude::*;
use serde_json::{Value, json};
use stepguard_types::Mapping;

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9_]{0,11}").expect("valid regex")
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        "[a-z0-9./-]{0,12}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

#[derive(Clone, Debug)]
enum Step {
    Key(String),
    Indexed(String, usize, usize),
}

/// A chain of segments plus the leaf they lead to.
fn arb_path() -> impl Strategy<Value = (Vec<Step>, Value)> {
    let step = prop_oneof![
        arb_key().prop_map(Step::Key),
        (arb_key(), 1usize..4)
            .prop_flat_map(|(k, len)| (Just(k), 0..len, Just(len)))
            .prop_map(|(k, i, len)| Step::Indexed(k, i, len)),
    ];
    (prop::collection::vec(step, 1..5), arb_leaf())
}

/// Build a document in which the path resolves to `leaf`.
fn build(steps: &[Step], leaf: Value) -> Value {
    let mut current = leaf;
    for step in steps.iter().rev() {
        let mut map = Mapping::new();
        match step {
            Step::Key(k) => {
                map.insert(k.clone(), current);
            }
            Step::Indexed(k, i, len) => {
                let mut items = vec![json!("filler"); *len];
                items[*i] = current;
                map.insert(k.clone(), Value::Array(items));
            }
        }
        current = Value::Object(map);
    }
    current
}

fn render(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|s| match s {
            Step::Key(k) => k.clone(),
            Step::Indexed(k, i, _) => format!("{k}[{i}]"),
        })
        .collect::<Vec<_>>()
        .join(".")
}

fn arb_operator() -> impl Strategy<Value = Option<Operator>> {
    prop_oneof![
        Just(None),
        Just(Some(Operator::Eq)),
        Just(Some(Operator::Ne)),
        Just(Some(Operator::Gt)),
        Just(Some(Operator::Lt)),
        Just(Some(Operator::Ge)),
        Just(Some(Operator::Le)),
        Just(Some(Operator::Contains)),
        Just(Some(Operator::Regex)),
    ]
}

fn arb_kind() -> impl Strategy<Value = RuleKind> {
    prop_oneof![
        Just(RuleKind::Property),
        Just(RuleKind::Exists),
        Just(RuleKind::Count),
        Just(RuleKind::Custom),
    ]
}

fn arb_rule() -> impl Strategy<Value = ValidationRule> {
    (
        arb_kind(),
        "[A-Za-z\\[\\]0-9.]{0,16}",
        arb_value(),
        arb_operator(),
        any::<bool>(),
    )
        .prop_map(|(kind, property, expected, operator, is_error)| ValidationRule {
            name: "generated".to_string(),
            kind,
            property,
            expected,
            operator,
            error_message: "generated rule failed".to_string(),
            severity: if is_error {
                RuleSeverity::Error
            } else {
                RuleSeverity::Warning
            },
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn generated_paths_resolve_to_their_leaf((steps, leaf) in arb_path()) {
        let doc = build(&steps, leaf.clone());
        let got = resolve(&doc, &render(&steps));
        prop_assert_eq!(got, Resolved::found(leaf));
    }

    #[test]
    fn arbitrary_paths_never_panic(doc in arb_value(), path in "[A-Za-z0-9\\[\\]._-]{0,24}") {
        let got = resolve(&doc, &path);
        if !got.found {
            prop_assert_eq!(got.value, Value::Null);
        }
    }

    #[test]
    fn evaluate_never_panics(actual in arb_value(), found in any::<bool>(), rule in arb_rule()) {
        let resolved = if found { Resolved::found(actual) } else { Resolved::missing() };
        let _ = evaluate(&resolved, &rule);
    }

    #[test]
    fn eq_ignores_integer_float_representation(i in -1_000_000i64..1_000_000) {
        let rule = ValidationRule {
            name: "n".to_string(),
            kind: RuleKind::Property,
            property: "n".to_string(),
            expected: Value::from(i as f64),
            operator: Some(Operator::Eq),
            error_message: String::new(),
            severity: RuleSeverity::Error,
        };
        prop_assert!(evaluate(&Resolved::found(Value::from(i)), &rule).is_none());
    }

    #[test]
    fn aggregation_is_deterministic(
        props in prop::collection::btree_map(arb_key(), arb_value(), 0..8),
        rules in prop::collection::vec(arb_rule(), 0..6),
    ) {
        let props: Mapping = props.into_iter().collect();
        let def = ResourceDefinition {
            resource_type: "AWS::EC2::VPC".to_string(),
            identifier: "vpc".to_string(),
            name: String::new(),
            required: true,
            rule_names: vec!["generated".to_string()],
        };
        let evaluator = Evaluator::default();
        let first = aggregate_resource(&def, Some(props.clone()), &rules, &evaluator);
        let second = aggregate_resource(&def, Some(props), &rules, &evaluator);
        let a = serde_json::to_string(&first).expect("serialize");
        let b = serde_json::to_string(&second).expect("serialize");
        prop_assert_eq!(a, b);
    }
}
