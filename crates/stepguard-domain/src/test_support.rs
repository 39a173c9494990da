use crate::model::{
    Operator, ResourceDefinition, RuleKind, RuleSeverity, StepDefinition, ValidationRule,
};
use crate::ports::{CallContext, ConfigError, ConfigProvider, OracleError, ResourceOracle, StackOracle};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use stepguard_types::Mapping;

pub fn step(number: u32, name: &str, resources: Vec<ResourceDefinition>) -> StepDefinition {
    StepDefinition {
        number,
        name: name.to_string(),
        description: String::new(),
        resources,
        stacks: Vec::new(),
        dependencies: Vec::new(),
    }
}

pub fn resource(resource_type: &str, identifier: &str, required: bool, rules: &[&str]) -> ResourceDefinition {
    ResourceDefinition {
        resource_type: resource_type.to_string(),
        identifier: identifier.to_string(),
        name: String::new(),
        required,
        rule_names: rules.iter().map(|r| r.to_string()).collect(),
    }
}

pub fn rule(
    name: &str,
    kind: RuleKind,
    property: &str,
    expected: Value,
    operator: Option<Operator>,
    severity: RuleSeverity,
) -> ValidationRule {
    ValidationRule {
        name: name.to_string(),
        kind,
        property: property.to_string(),
        expected,
        operator,
        error_message: format!("{name} check failed"),
        severity,
    }
}

#[derive(Default)]
pub struct FakeConfig {
    steps: BTreeMap<u32, StepDefinition>,
    rule_sets: BTreeMap<String, Vec<ValidationRule>>,
    broken_rule_sets: BTreeMap<String, String>,
    pub rule_loads: AtomicUsize,
}

impl FakeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.insert(step.number, step);
        self
    }

    pub fn with_rules(mut self, resource_type: &str, rules: Vec<ValidationRule>) -> Self {
        self.rule_sets.insert(resource_type.to_string(), rules);
        self
    }

    pub fn with_broken_rules(mut self, resource_type: &str, reason: &str) -> Self {
        self.broken_rule_sets
            .insert(resource_type.to_string(), reason.to_string());
        self
    }
}

impl ConfigProvider for FakeConfig {
    fn load_step(&self, number: u32, _ctx: &CallContext) -> Result<StepDefinition, ConfigError> {
        self.steps
            .get(&number)
            .cloned()
            .ok_or(ConfigError::StepNotFound(number))
    }

    fn load_rule_set(
        &self,
        resource_type: &str,
        _ctx: &CallContext,
    ) -> Result<Vec<ValidationRule>, ConfigError> {
        self.rule_loads.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.broken_rule_sets.get(resource_type) {
            return Err(ConfigError::Invalid {
                what: format!("rules for {resource_type}"),
                reason: reason.clone(),
            });
        }
        Ok(self
            .rule_sets
            .get(resource_type)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeState {
    resources: BTreeMap<(String, String), Mapping>,
    failures: BTreeMap<String, OracleError>,
    stacks: BTreeSet<String>,
    stack_failure: Option<OracleError>,
    pub exists_calls: AtomicUsize,
    pub stack_calls: AtomicUsize,
}

impl FakeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, resource_type: &str, identifier: &str, props: Value) -> Self {
        let props = match props {
            Value::Object(map) => map,
            _ => Mapping::new(),
        };
        self.resources
            .insert((resource_type.to_string(), identifier.to_string()), props);
        self
    }

    /// Every existence check for `identifier` fails with `err`.
    pub fn with_failure(mut self, identifier: &str, err: OracleError) -> Self {
        self.failures.insert(identifier.to_string(), err);
        self
    }

    pub fn with_stack(mut self, name: &str) -> Self {
        self.stacks.insert(name.to_string());
        self
    }

    pub fn with_stack_failure(mut self, err: OracleError) -> Self {
        self.stack_failure = Some(err);
        self
    }
}

impl ResourceOracle for FakeState {
    fn check_exists(
        &self,
        resource_type: &str,
        identifier: &str,
        _ctx: &CallContext,
    ) -> Result<Option<Mapping>, OracleError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.get(identifier) {
            return Err(err.clone());
        }
        Ok(self
            .resources
            .get(&(resource_type.to_string(), identifier.to_string()))
            .cloned())
    }
}

impl StackOracle for FakeState {
    fn stack_exists(&self, name: &str, _ctx: &CallContext) -> Result<bool, OracleError> {
        self.stack_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.stack_failure {
            return Err(err.clone());
        }
        Ok(self.stacks.contains(name))
    }
}
