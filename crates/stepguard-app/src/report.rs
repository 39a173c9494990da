use anyhow::Context;
use stepguard_render::{
    RenderableError, RenderablePayload, RenderableReport, RenderableResource,
    RenderableResourceStatus, RenderableStep, RenderableStepStatus, RenderableSummary,
    RenderableVerdictStatus, RenderableWarning,
};
use stepguard_types::{
    ReportPayload, ResourceResult, ResourceStatus, SCHEMA_REPORT_V1, StepStatus, StepguardReport,
    ValidationResult, Verdict,
};

pub fn parse_report_json(text: &str) -> anyhow::Result<StepguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse stepguard v1 report")
}

pub fn serialize_report(report: &StepguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn to_renderable(report: &StepguardReport) -> RenderableReport {
    RenderableReport {
        verdict: match report.verdict {
            Verdict::Pass => RenderableVerdictStatus::Pass,
            Verdict::Warn => RenderableVerdictStatus::Warn,
            Verdict::Fail => RenderableVerdictStatus::Fail,
        },
        payload: match &report.data {
            ReportPayload::Step(result) => RenderablePayload::Step(renderable_step(result)),
            ReportPayload::Summary(summary) => RenderablePayload::Summary(RenderableSummary {
                total_steps: summary.total_steps,
                passed_steps: summary.passed_steps,
                failed_steps: summary.failed_steps,
                warning_steps: summary.warning_steps,
                skipped_steps: summary.skipped_steps,
                steps: summary.results.iter().map(renderable_step).collect(),
            }),
        },
    }
}

fn renderable_step(result: &ValidationResult) -> RenderableStep {
    RenderableStep {
        number: result.step_number,
        name: result.step_name.clone(),
        status: match result.status {
            StepStatus::Pending => RenderableStepStatus::Pending,
            StepStatus::Passed => RenderableStepStatus::Passed,
            StepStatus::Failed => RenderableStepStatus::Failed,
            StepStatus::Warning => RenderableStepStatus::Warning,
            StepStatus::Skipped => RenderableStepStatus::Skipped,
        },
        duration_ms: result.duration.as_millis().min(u128::from(u64::MAX)) as u64,
        resources: result.resources.iter().map(renderable_resource).collect(),
        errors: result
            .errors
            .iter()
            .map(|e| RenderableError {
                message: e.message.clone(),
                suggestion: e.suggestion.clone(),
                document_ref: e.document_ref.clone(),
            })
            .collect(),
        warnings: result
            .warnings
            .iter()
            .map(|w| RenderableWarning {
                resource: w.resource.clone(),
                message: w.message.clone(),
            })
            .collect(),
    }
}

fn renderable_resource(r: &ResourceResult) -> RenderableResource {
    RenderableResource {
        resource_type: r.resource_type.clone(),
        name: r.name.clone(),
        status: match r.status {
            ResourceStatus::NotFound => RenderableResourceStatus::NotFound,
            ResourceStatus::Exists => RenderableResourceStatus::Exists,
            ResourceStatus::Misconfigured => RenderableResourceStatus::Misconfigured,
            ResourceStatus::Pending => RenderableResourceStatus::Pending,
        },
        errors: r.errors.clone(),
        // Resource warnings are already surfaced as step warnings.
        warnings: Vec::new(),
    }
}
