use crate::{
    RenderablePayload, RenderableReport, RenderableResourceStatus, RenderableStep,
    RenderableStepStatus, RenderableVerdictStatus,
};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# stepguard report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    out.push_str(&format!("- Verdict: **{verdict}**\n"));

    match &report.payload {
        RenderablePayload::Step(step) => {
            out.push('\n');
            render_step(&mut out, step);
        }
        RenderablePayload::Summary(summary) => {
            out.push_str(&format!(
                "- Steps: {} total, {} passed, {} warning, {} failed, {} skipped\n",
                summary.total_steps,
                summary.passed_steps,
                summary.warning_steps,
                summary.failed_steps,
                summary.skipped_steps
            ));
            if summary.steps.is_empty() {
                out.push_str("\nNo steps were validated.\n");
            }
            for step in &summary.steps {
                out.push('\n');
                render_step(&mut out, step);
            }
        }
    }

    out
}

fn render_step(out: &mut String, step: &RenderableStep) {
    out.push_str(&format!(
        "## Step {}: {} ({})\n\n",
        step.number,
        escape(&step.name),
        step_status(step.status)
    ));

    if !step.resources.is_empty() {
        out.push_str("| Resource | Type | Status |\n|---|---|---|\n");
        for r in &step.resources {
            out.push_str(&format!(
                "| {} | `{}` | {} |\n",
                escape(&r.name),
                r.resource_type,
                resource_status(r.status)
            ));
        }
        out.push('\n');
    }

    let resource_errors: Vec<(&str, &str)> = step
        .resources
        .iter()
        .flat_map(|r| r.errors.iter().map(move |e| (r.name.as_str(), e.as_str())))
        .collect();

    if step.errors.is_empty() && step.warnings.is_empty() && resource_errors.is_empty() {
        out.push_str("No findings.\n");
        return;
    }

    for e in &step.errors {
        out.push_str(&format!("- [ERROR] {}\n", e.message));
        if let Some(s) = &e.suggestion {
            out.push_str(&format!("  - suggestion: {s}\n"));
        }
        if let Some(d) = &e.document_ref {
            out.push_str(&format!("  - reference: {d}\n"));
        }
    }
    for (name, e) in resource_errors {
        out.push_str(&format!("- [ERROR] {name}: {e}\n"));
    }
    for w in &step.warnings {
        out.push_str(&format!("- [WARN] {}: {}\n", w.resource, w.message));
    }
}

fn step_status(status: RenderableStepStatus) -> &'static str {
    match status {
        RenderableStepStatus::Pending => "PENDING",
        RenderableStepStatus::Passed => "PASSED",
        RenderableStepStatus::Failed => "FAILED",
        RenderableStepStatus::Warning => "WARNING",
        RenderableStepStatus::Skipped => "SKIPPED",
    }
}

fn resource_status(status: RenderableResourceStatus) -> &'static str {
    match status {
        RenderableResourceStatus::NotFound => "NOT_FOUND",
        RenderableResourceStatus::Exists => "EXISTS",
        RenderableResourceStatus::Misconfigured => "MISCONFIGURED",
        RenderableResourceStatus::Pending => "PENDING",
    }
}

/// Table cells cannot contain raw pipes.
fn escape(s: &str) -> String {
    s.replace('|', "\\|")
}
