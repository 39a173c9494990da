//! Explain registry for error kinds and rule kinds.
//!
//! Maps error codes and rule kinds to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for an error kind or rule kind.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the error/rule kind.
    pub title: &'static str,
    /// What it means and when it is reported.
    pub description: &'static str,
    /// How to fix it.
    pub remediation: &'static str,
    /// Before/after catalog examples.
    pub examples: ExamplePair,
}

/// Before and after catalog examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Declaration that produces a failure.
    pub before: &'static str,
    /// Declaration that passes.
    pub after: &'static str,
}

/// Look up an explanation by error code or rule kind.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Error kinds
        ids::CODE_RESOURCE_NOT_FOUND => Some(explain_resource_not_found()),
        ids::CODE_PROPERTY_MISMATCH => Some(explain_property_mismatch()),
        ids::CODE_CONFIGURATION_INVALID => Some(explain_configuration_invalid()),
        ids::CODE_UPSTREAM_API_FAILURE => Some(explain_upstream_api_failure()),
        ids::CODE_AUTHENTICATION_FAILURE => Some(explain_authentication_failure()),
        ids::CODE_PERMISSION_DENIED => Some(explain_permission_denied()),
        ids::CODE_NETWORK_FAILURE => Some(explain_network_failure()),

        // Rule kinds
        ids::RULE_PROPERTY => Some(explain_property_rule()),
        ids::RULE_EXISTS => Some(explain_exists_rule()),
        ids::RULE_COUNT => Some(explain_count_rule()),
        ids::RULE_CUSTOM => Some(explain_custom_rule()),

        _ => None,
    }
}

/// List all known error codes.
pub fn all_error_codes() -> &'static [&'static str] {
    &[
        ids::CODE_RESOURCE_NOT_FOUND,
        ids::CODE_PROPERTY_MISMATCH,
        ids::CODE_CONFIGURATION_INVALID,
        ids::CODE_UPSTREAM_API_FAILURE,
        ids::CODE_AUTHENTICATION_FAILURE,
        ids::CODE_PERMISSION_DENIED,
        ids::CODE_NETWORK_FAILURE,
    ]
}

/// List all known rule kinds.
pub fn all_rule_kinds() -> &'static [&'static str] {
    &[
        ids::RULE_PROPERTY,
        ids::RULE_EXISTS,
        ids::RULE_COUNT,
        ids::RULE_CUSTOM,
    ]
}

// --- Error kinds ---

fn explain_resource_not_found() -> Explanation {
    Explanation {
        title: "Resource Not Found",
        description: "\
A resource or stack declared by the step could not be found.

Reported when:
- a `required: true` resource is absent (or its existence check failed)
- a stack listed under `cloudformation_stacks` does not exist",
        remediation: "\
Create the resource with the exact name/identifier the step declares, then re-run the step.
If the resource exists under another name, fix the `identifier` in the step file.",
        examples: ExamplePair {
            before: r#"resources:
  - type: AWS::EC2::VPC
    identifier: sbcntr-vpc   # no VPC tagged with this name
    required: true"#,
            after: r#"resources:
  - type: AWS::EC2::VPC
    identifier: sbcntr-vpc   # VPC created and tagged Name=sbcntr-vpc
    required: true"#,
        },
    }
}

fn explain_property_mismatch() -> Explanation {
    Explanation {
        title: "Property Mismatch",
        description: "\
A resource exists but one of its properties does not satisfy a rule.

Error-severity rules mark the resource MISCONFIGURED and fail the step;
warning-severity rules only add a warning.",
        remediation: "\
Compare the `expected` and `actual` values in the report and change the resource to match.",
        examples: ExamplePair {
            before: "CidrBlock: 10.1.0.0/16",
            after: "CidrBlock: 10.0.0.0/16",
        },
    }
}

fn explain_configuration_invalid() -> Explanation {
    Explanation {
        title: "Configuration Invalid",
        description: "\
A rule or step definition cannot be evaluated as written, for example a `count` rule whose
`expected` value is not an integer, or an unsupported operator.",
        remediation: "\
Fix the rule in the catalog. `count` rules need an integer `expected` and one of
eq, ne, gt, lt, ge, le.",
        examples: ExamplePair {
            before: r#"- name: two-subnets
  type: count
  property: Subnets
  expected: "two""#,
            after: r#"- name: two-subnets
  type: count
  property: Subnets
  expected: 2"#,
        },
    }
}

fn explain_upstream_api_failure() -> Explanation {
    Explanation {
        title: "Upstream API Failure",
        description: "\
The resource-state provider returned an unexpected error. The resource is treated as not
found for this run; the run itself continues.",
        remediation: "\
Retry the run. If the failure persists, check the provider's status and the tool's logs
(`-vv`).",
        examples: ExamplePair {
            before: "HTTP 500 from the state endpoint",
            after: "HTTP 200 with the resource properties",
        },
    }
}

fn explain_authentication_failure() -> Explanation {
    Explanation {
        title: "Authentication Failure",
        description: "\
The resource-state provider rejected the credentials used by the tool.",
        remediation: "\
Refresh or configure the credentials the provider expects, then re-run.",
        examples: ExamplePair {
            before: "HTTP 401 from the state endpoint",
            after: "valid credentials configured",
        },
    }
}

fn explain_permission_denied() -> Explanation {
    Explanation {
        title: "Permission Denied",
        description: "\
The credentials are valid but are not allowed to describe the resource.",
        remediation: "\
Grant read/describe permissions for the resource type to the identity running the tool.",
        examples: ExamplePair {
            before: "HTTP 403 from the state endpoint",
            after: "read-only describe permissions granted",
        },
    }
}

fn explain_network_failure() -> Explanation {
    Explanation {
        title: "Network Failure",
        description: "\
The resource-state provider could not be reached, or the call exceeded its timeout or the
run deadline.",
        remediation: "\
Check connectivity to the provider, or raise `timeout_ms` / `deadline_ms` in stepguard.toml.",
        examples: ExamplePair {
            before: "timeout_ms = 100",
            after: "timeout_ms = 30000",
        },
    }
}

// --- Rule kinds ---

fn explain_property_rule() -> Explanation {
    Explanation {
        title: "Property Rule",
        description: "\
Compares the value at `property` against `expected` with `operator`
(eq, ne, gt, lt, ge, le, contains, regex). An unresolved path is compared as null.
`eq` treats integers and floats with the same value as equal. A rule without an
operator is never checked.",
        remediation: "\
Make the resource property satisfy the comparison, or fix `expected`/`operator` in the rule.",
        examples: ExamplePair {
            before: r#"- name: vpc-cidr
  type: property
  property: CidrBlock
  expected: 10.0.0.0/16"#,
            after: r#"- name: vpc-cidr
  type: property
  property: CidrBlock
  operator: eq
  expected: 10.0.0.0/16
  severity: error"#,
        },
    }
}

fn explain_exists_rule() -> Explanation {
    Explanation {
        title: "Exists Rule",
        description: "\
Fails when the path in `property` cannot be resolved. Paths use `.` between keys and
`name[index]` for list elements, e.g. `IngressRules[0].FromPort`.",
        remediation: "\
Configure the resource so the property is present.",
        examples: ExamplePair {
            before: r#"- name: has-ingress
  type: exists
  property: IngressRules[0]"#,
            after: r#"- name: has-ingress
  type: exists
  property: IngressRules[0]
  error_message: security group has no ingress rule"#,
        },
    }
}

fn explain_count_rule() -> Explanation {
    Explanation {
        title: "Count Rule",
        description: "\
Counts the elements of a list (or keys of a map) at `property` and compares the count to the
integer `expected`. The operator defaults to eq.",
        remediation: "\
Add or remove elements until the count matches, or fix the rule's `expected`.",
        examples: ExamplePair {
            before: r#"- name: two-ingress-rules
  type: count
  property: IngressRules
  expected: 2.5"#,
            after: r#"- name: two-ingress-rules
  type: count
  property: IngressRules
  operator: ge
  expected: 2"#,
        },
    }
}

fn explain_custom_rule() -> Explanation {
    Explanation {
        title: "Custom Rule",
        description: "\
Delegates to a predicate registered under the rule's name. With no registered predicate the
rule always passes.",
        remediation: "\
Register a predicate for the rule name when embedding the engine, or remove the rule.",
        examples: ExamplePair {
            before: r#"- name: tag-policy
  type: custom"#,
            after: r#"- name: tag-policy
  type: custom
  error_message: tags do not follow the naming policy"#,
        },
    }
}
