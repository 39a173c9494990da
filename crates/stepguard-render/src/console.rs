use crate::{
    RenderablePayload, RenderableReport, RenderableResourceStatus, RenderableStep,
    RenderableStepStatus, RenderableSummary,
};

const HEAVY_RULE_WIDTH: usize = 60;
const LIGHT_RULE_WIDTH: usize = 40;

pub fn render_console(report: &RenderableReport) -> String {
    match &report.payload {
        RenderablePayload::Step(step) => render_console_step(step),
        RenderablePayload::Summary(summary) => render_console_summary(summary),
    }
}

pub fn render_console_step(step: &RenderableStep) -> String {
    let heavy = "=".repeat(HEAVY_RULE_WIDTH);
    let light = "-".repeat(LIGHT_RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{heavy}\n"));
    out.push_str(&format!("STEP {}: {}\n", step.number, step.name));
    out.push_str(&format!("{heavy}\n"));
    out.push_str(&format!("Status: {}\n", status_label(step.status)));
    out.push_str(&format!("Duration: {}ms\n\n", step.duration_ms));

    if !step.resources.is_empty() {
        out.push_str("Resources Checked:\n");
        out.push_str(&format!("{light}\n"));
        for r in &step.resources {
            let name = if r.name.is_empty() { "(unnamed)" } else { r.name.as_str() };
            out.push_str(&format!(
                "{} {} ({})\n",
                resource_icon(r.status),
                name,
                r.resource_type
            ));
            for e in &r.errors {
                out.push_str(&format!("  ❌ {e}\n"));
            }
            for w in &r.warnings {
                out.push_str(&format!("  ⚠️  {w}\n"));
            }
        }
        out.push('\n');
    }

    if !step.errors.is_empty() {
        out.push_str("❌ Errors:\n");
        out.push_str(&format!("{light}\n"));
        for e in &step.errors {
            out.push_str(&format!("• {}\n", e.message));
            if let Some(s) = &e.suggestion {
                out.push_str(&format!("  💡 Suggestion: {s}\n"));
            }
            if let Some(d) = &e.document_ref {
                out.push_str(&format!("  📖 Reference: {d}\n"));
            }
            out.push('\n');
        }
    }

    if !step.warnings.is_empty() {
        out.push_str("⚠️  Warnings:\n");
        out.push_str(&format!("{light}\n"));
        for w in &step.warnings {
            out.push_str(&format!("• {}: {}\n", w.resource, w.message));
        }
        out.push('\n');
    }

    out.push_str(&format!("{heavy}\n"));
    let footer = match step.status {
        RenderableStepStatus::Passed => "✅ All checks passed! You can proceed to the next step.",
        RenderableStepStatus::Warning => {
            "⚠️  Validation completed with warnings. Please review the warnings above."
        }
        RenderableStepStatus::Failed => {
            "❌ Validation failed. Please fix the errors above before proceeding."
        }
        RenderableStepStatus::Skipped => "⏭️  Validation was skipped.",
        RenderableStepStatus::Pending => "⏸️  Validation did not complete.",
    };
    out.push_str(footer);
    out.push('\n');
    out
}

pub fn render_console_summary(summary: &RenderableSummary) -> String {
    let heavy = "=".repeat(HEAVY_RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{heavy}\n"));
    out.push_str("VALIDATION SUMMARY REPORT\n");
    out.push_str(&format!("{heavy}\n\n"));

    out.push_str(&format!("Total Steps: {}\n", summary.total_steps));
    out.push_str(&format!("✅ Passed: {}\n", summary.passed_steps));
    out.push_str(&format!("⚠️  Warnings: {}\n", summary.warning_steps));
    out.push_str(&format!("❌ Failed: {}\n", summary.failed_steps));
    out.push_str(&format!("⏭️  Skipped: {}\n\n", summary.skipped_steps));

    for step in &summary.steps {
        out.push_str(&format!(
            "{} Step {}: {}\n",
            status_label(step.status),
            step.number,
            step.name
        ));
        if step.status == RenderableStepStatus::Failed {
            for e in &step.errors {
                out.push_str(&format!("   - {}\n", e.message));
            }
            for r in step.resources.iter().filter(|r| !r.errors.is_empty()) {
                for e in &r.errors {
                    out.push_str(&format!("   - {}: {e}\n", r.name));
                }
            }
        }
    }

    out.push_str(&format!("\n{heavy}\n"));
    if summary.failed_steps > 0 {
        out.push_str(&format!(
            "❌ {} step(s) failed validation.\nPlease review and fix the errors before proceeding.\n",
            summary.failed_steps
        ));
    } else if summary.skipped_steps > 0 {
        out.push_str("⚠️  Some steps were skipped.\nRun individual step validations for more details.\n");
    } else if summary.warning_steps > 0 {
        out.push_str(&format!(
            "⚠️  {} step(s) passed with warnings.\nReview the warnings before proceeding.\n",
            summary.warning_steps
        ));
    } else {
        out.push_str("🎉 Congratulations! All steps validated successfully!\n");
    }
    out.push_str(&format!("{heavy}\n"));
    out
}

fn status_label(status: RenderableStepStatus) -> &'static str {
    match status {
        RenderableStepStatus::Passed => "✅ PASSED",
        RenderableStepStatus::Failed => "❌ FAILED",
        RenderableStepStatus::Warning => "⚠️  WARNING",
        RenderableStepStatus::Skipped => "⏭️  SKIPPED",
        RenderableStepStatus::Pending => "⏸️  PENDING",
    }
}

fn resource_icon(status: RenderableResourceStatus) -> &'static str {
    match status {
        RenderableResourceStatus::Exists => "✅",
        RenderableResourceStatus::NotFound => "❌",
        RenderableResourceStatus::Misconfigured => "⚠️ ",
        RenderableResourceStatus::Pending => "⏸️ ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RenderableError, RenderableResource, RenderableWarning};

    fn failed_step() -> RenderableStep {
        RenderableStep {
            number: 2,
            name: "Network".to_string(),
            status: RenderableStepStatus::Failed,
            duration_ms: 42,
            resources: vec![
                RenderableResource {
                    resource_type: "AWS::EC2::VPC".to_string(),
                    name: "sbcntr-vpc".to_string(),
                    status: RenderableResourceStatus::Misconfigured,
                    errors: vec!["vpc-cidr: expected 10.0.0.0/16, got 10.1.0.0/16".to_string()],
                    warnings: Vec::new(),
                },
                RenderableResource {
                    resource_type: "AWS::EC2::Subnet".to_string(),
                    name: "subnet-a".to_string(),
                    status: RenderableResourceStatus::NotFound,
                    errors: Vec::new(),
                    warnings: Vec::new(),
                },
            ],
            errors: vec![RenderableError {
                message: "Required resource 'subnet-a' not found".to_string(),
                suggestion: Some("Please create the resource 'subnet-a' as described in step 2".to_string()),
                document_ref: Some("Step 2".to_string()),
            }],
            warnings: vec![RenderableWarning {
                resource: "sbcntr-vpc".to_string(),
                message: "dns: expected true, got false".to_string(),
            }],
        }
    }

    #[test]
    fn renders_failed_step() {
        insta::assert_snapshot!(render_console_step(&failed_step()), @r"
        ============================================================
        STEP 2: Network
        ============================================================
        Status: ❌ FAILED
        Duration: 42ms

        Resources Checked:
        ----------------------------------------
        ⚠️  sbcntr-vpc (AWS::EC2::VPC)
          ❌ vpc-cidr: expected 10.0.0.0/16, got 10.1.0.0/16
        ❌ subnet-a (AWS::EC2::Subnet)

        ❌ Errors:
        ----------------------------------------
        • Required resource 'subnet-a' not found
          💡 Suggestion: Please create the resource 'subnet-a' as described in step 2
          📖 Reference: Step 2

        ⚠️  Warnings:
        ----------------------------------------
        • sbcntr-vpc: dns: expected true, got false

        ============================================================
        ❌ Validation failed. Please fix the errors above before proceeding.
        ");
    }

    #[test]
    fn passed_step_without_resources_has_no_sections() {
        let step = RenderableStep {
            number: 1,
            name: "Setup".to_string(),
            status: RenderableStepStatus::Passed,
            duration_ms: 0,
            resources: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        };
        let out = render_console_step(&step);
        assert!(!out.contains("Resources Checked"));
        assert!(!out.contains("Errors:"));
        assert!(out.contains("Status: ✅ PASSED"));
        assert!(out.ends_with("You can proceed to the next step.\n"));
    }

    #[test]
    fn summary_lists_failures_and_overall_status() {
        let mut passed = failed_step();
        passed.number = 1;
        passed.name = "VPC".to_string();
        passed.status = RenderableStepStatus::Passed;
        let summary = RenderableSummary {
            total_steps: 6,
            passed_steps: 1,
            failed_steps: 1,
            warning_steps: 0,
            skipped_steps: 4,
            steps: vec![passed, failed_step()],
        };
        let out = render_console_summary(&summary);
        assert!(out.contains("Total Steps: 6\n"));
        assert!(out.contains("⏭️  Skipped: 4\n"));
        assert!(out.contains("✅ PASSED Step 1: VPC\n"));
        assert!(out.contains("❌ FAILED Step 2: Network\n"));
        assert!(out.contains("   - Required resource 'subnet-a' not found\n"));
        assert!(out.contains("   - sbcntr-vpc: vpc-cidr: expected 10.0.0.0/16, got 10.1.0.0/16\n"));
        assert!(out.contains("❌ 1 step(s) failed validation."));
        // Errors of passing steps are not listed.
        assert_eq!(out.matches("Required resource").count(), 1);
    }

    #[test]
    fn summary_overall_status_precedence() {
        let mut summary = RenderableSummary {
            total_steps: 2,
            passed_steps: 2,
            failed_steps: 0,
            warning_steps: 0,
            skipped_steps: 0,
            steps: Vec::new(),
        };
        assert!(render_console_summary(&summary).contains("🎉 Congratulations!"));
        summary.warning_steps = 1;
        assert!(render_console_summary(&summary).contains("1 step(s) passed with warnings"));
        summary.skipped_steps = 1;
        assert!(render_console_summary(&summary).contains("Some steps were skipped"));
    }
}
