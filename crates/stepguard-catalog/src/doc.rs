//! YAML document shapes for step and rule files, and their conversion to the domain model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use stepguard_domain::model::{
    Operator, ResourceDefinition, RuleKind, RuleSeverity, StepDefinition, UnknownVariant,
    ValidationRule,
};
use stepguard_types::StructuredValue;

/// Schema identifier published for rule files.
pub const SCHEMA_RULES_V1: &str = "stepguard.rules.v1";

/// `steps/step<N>.yaml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepFile {
    /// Informational; the file name decides the step number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    #[serde(default)]
    pub cloudformation_stacks: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceEntry {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    /// Names of rules from the rule file for `type`.
    #[serde(default)]
    pub validation_rules: Vec<String>,
}

/// `resources/**/*.yaml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleFile {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub validation_rules: Vec<RuleEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleEntry {
    pub name: String,
    /// `property`, `exists`, `count` or `custom`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub property: String,
    #[serde(default)]
    pub expected: StructuredValue,
    /// `eq` (default), `ne`, `gt`, `lt`, `ge`, `le`, `contains` or `regex`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default)]
    pub error_message: String,
    /// `error` fails the resource; anything else is a warning.
    #[serde(default)]
    pub severity: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    #[error("rule {rule}: {source}")]
    Rule {
        rule: String,
        #[source]
        source: UnknownVariant,
    },
    #[error("resource #{index} has no type")]
    MissingType { index: usize },
}

impl StepFile {
    pub fn into_definition(self, number: u32) -> Result<StepDefinition, DocError> {
        let resources = self
            .resources
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                if entry.resource_type.trim().is_empty() {
                    return Err(DocError::MissingType { index });
                }
                Ok(ResourceDefinition {
                    resource_type: entry.resource_type,
                    identifier: entry.identifier,
                    name: entry.name,
                    required: entry.required,
                    rule_names: entry.validation_rules,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StepDefinition {
            number,
            name: self.name,
            description: self.description,
            resources,
            stacks: self.cloudformation_stacks,
            dependencies: self.dependencies,
        })
    }
}

impl RuleFile {
    pub fn into_rules(self) -> Result<Vec<ValidationRule>, DocError> {
        self.validation_rules
            .into_iter()
            .map(RuleEntry::into_rule)
            .collect()
    }
}

impl RuleEntry {
    pub fn into_rule(self) -> Result<ValidationRule, DocError> {
        let wrap = |source| DocError::Rule {
            rule: self.name.clone(),
            source,
        };
        let kind: RuleKind = self.kind.parse().map_err(wrap)?;
        let operator = match self.operator.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(op) => Some(op.parse::<Operator>().map_err(wrap)?),
        };
        Ok(ValidationRule {
            severity: RuleSeverity::from_label(&self.severity),
            name: self.name,
            kind,
            property: self.property,
            expected: self.expected,
            operator,
            error_message: self.error_message,
        })
    }
}
