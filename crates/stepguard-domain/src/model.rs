use std::fmt;
use std::str::FromStr;
use stepguard_types::{StructuredValue, ids};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    Property,
    Exists,
    Count,
    Custom,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Property => ids::RULE_PROPERTY,
            RuleKind::Exists => ids::RULE_EXISTS,
            RuleKind::Count => ids::RULE_COUNT,
            RuleKind::Custom => ids::RULE_CUSTOM,
        }
    }
}

impl FromStr for RuleKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ids::RULE_PROPERTY => Ok(RuleKind::Property),
            ids::RULE_EXISTS => Ok(RuleKind::Exists),
            ids::RULE_COUNT => Ok(RuleKind::Count),
            ids::RULE_CUSTOM => Ok(RuleKind::Custom),
            other => Err(UnknownVariant {
                what: "rule type",
                value: other.to_string(),
                expected: "property|exists|count|custom",
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
    Regex,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => ids::OP_EQ,
            Operator::Ne => ids::OP_NE,
            Operator::Gt => ids::OP_GT,
            Operator::Lt => ids::OP_LT,
            Operator::Ge => ids::OP_GE,
            Operator::Le => ids::OP_LE,
            Operator::Contains => ids::OP_CONTAINS,
            Operator::Regex => ids::OP_REGEX,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ids::OP_EQ => Ok(Operator::Eq),
            ids::OP_NE => Ok(Operator::Ne),
            ids::OP_GT => Ok(Operator::Gt),
            ids::OP_LT => Ok(Operator::Lt),
            ids::OP_GE => Ok(Operator::Ge),
            ids::OP_LE => Ok(Operator::Le),
            ids::OP_CONTAINS => Ok(Operator::Contains),
            ids::OP_REGEX => Ok(Operator::Regex),
            other => Err(UnknownVariant {
                what: "operator",
                value: other.to_string(),
                expected: "eq|ne|gt|lt|ge|le|contains|regex",
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what}: {value} (expected {expected})")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Only `error` escalates; everything else is reported as a warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleSeverity {
    Error,
    Warning,
}

impl RuleSeverity {
    pub fn from_label(label: &str) -> Self {
        if label == "error" {
            RuleSeverity::Error
        } else {
            RuleSeverity::Warning
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationRule {
    pub name: String,
    pub kind: RuleKind,
    /// Dotted/indexed path into the resource properties, e.g. `IngressRules[0].FromPort`.
    pub property: String,
    pub expected: StructuredValue,
    pub operator: Option<Operator>,
    pub error_message: String,
    pub severity: RuleSeverity,
}

impl ValidationRule {
    /// Count rules without an operator compare for equality.
    pub fn count_operator(&self) -> Operator {
        self.operator.unwrap_or(Operator::Eq)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceDefinition {
    pub resource_type: String,
    pub identifier: String,
    pub name: String,
    pub required: bool,
    /// Rule names to apply, in order, looked up in the rule set for `resource_type`.
    pub rule_names: Vec<String>,
}

impl ResourceDefinition {
    /// Key handed to the existence oracle.
    pub fn lookup_key(&self) -> &str {
        if self.identifier.is_empty() {
            &self.name
        } else {
            &self.identifier
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.identifier
        } else {
            &self.name
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepDefinition {
    pub number: u32,
    pub name: String,
    pub description: String,
    pub resources: Vec<ResourceDefinition>,
    /// Stacks that must exist before the step's resources make sense.
    pub stacks: Vec<String>,
    /// Step numbers this step builds on (informational).
    pub dependencies: Vec<u32>,
}
