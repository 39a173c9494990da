//! Step-level status derivation, step errors and run tallies.

use crate::model::{ResourceDefinition, StepDefinition};
use std::fmt;
use stepguard_types::{
    ErrorKind, StepStatus, ValidationError, ValidationResult, ValidationSummary,
    ValidationWarning,
};

/// Errors first, then failing resources, then any warning.
pub fn derive_step_status(result: &ValidationResult) -> StepStatus {
    if !result.errors.is_empty() {
        return StepStatus::Failed;
    }
    if result.resources.iter().any(|r| r.is_failing()) {
        return StepStatus::Failed;
    }
    let resource_warnings = result.resources.iter().any(|r| !r.warnings.is_empty());
    if !result.warnings.is_empty() || resource_warnings {
        return StepStatus::Warning;
    }
    StepStatus::Passed
}

pub fn document_ref(step: &StepDefinition) -> String {
    format!("Step {}", step.number)
}

pub fn missing_stack(step: &StepDefinition, stack: &str) -> ValidationError {
    ValidationError {
        kind: ErrorKind::ResourceNotFound,
        resource: stack.to_string(),
        property: None,
        expected: None,
        actual: None,
        message: format!("CloudFormation stack '{stack}' not found"),
        suggestion: Some(format!(
            "Please create the stack '{stack}' as described in the handbook"
        )),
        document_ref: Some(document_ref(step)),
    }
}

pub fn missing_required_resource(
    step: &StepDefinition,
    def: &ResourceDefinition,
) -> ValidationError {
    let name = def.display_name();
    ValidationError {
        kind: ErrorKind::ResourceNotFound,
        resource: name.to_string(),
        property: None,
        expected: None,
        actual: None,
        message: format!("Required resource '{name}' not found"),
        suggestion: Some(format!(
            "Please create the resource '{name}' as described in step {}",
            step.number
        )),
        document_ref: Some(document_ref(step)),
    }
}

pub fn rule_set_unavailable(def: &ResourceDefinition, reason: impl fmt::Display) -> ValidationWarning {
    ValidationWarning {
        resource: def.display_name().to_string(),
        message: format!(
            "rules for {} could not be loaded, evaluated without rules: {reason}",
            def.resource_type
        ),
    }
}

/// Count a finished step into the run summary.
pub fn tally(summary: &mut ValidationSummary, result: ValidationResult) {
    match result.status {
        StepStatus::Passed => summary.passed_steps += 1,
        StepStatus::Failed => summary.failed_steps += 1,
        StepStatus::Warning => summary.warning_steps += 1,
        StepStatus::Skipped => summary.skipped_steps += 1,
        StepStatus::Pending => {}
    }
    summary.results.push(result);
}
