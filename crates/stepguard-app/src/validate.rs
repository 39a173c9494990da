//! The `validate` use case: run one step or every step and produce a report.

use anyhow::Context;
use std::time::Duration;
use stepguard_catalog::{Catalog, IndexOptions};
use stepguard_domain::ports::{CallContext, CancelToken, ResourceOracle, StackOracle};
use stepguard_domain::{CustomRules, Validator};
use stepguard_settings::{FailOn, Overrides, ResolvedConfig, StateSource};
use stepguard_state::{HttpOracle, NoStacks, OracleRegistry, Snapshot};
use stepguard_types::{
    ReportEnvelope, ReportPayload, SCHEMA_REPORT_V1, StepStatus, StepguardReport, ToolMeta,
    Verdict, ids,
};
use time::OffsetDateTime;
use tracing::info;

/// Which steps to validate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Step(u32),
    All,
}

/// Input for the validate use case.
#[derive(Debug)]
pub struct ValidateInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
    pub target: Target,
    /// Predicates for `custom` rules, keyed by rule name.
    pub custom_rules: CustomRules,
    /// Cancels outstanding collaborator calls when triggered.
    pub cancel: Option<CancelToken>,
}

/// Output from the validate use case.
#[derive(Clone, Debug)]
pub struct ValidateOutput {
    /// The generated report.
    pub report: StepguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the validate use case: parse config, open the catalog, wire the oracles, evaluate,
/// produce a report.
pub fn run_validate(input: ValidateInput<'_>) -> anyhow::Result<ValidateOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        stepguard_settings::StepguardConfigV1::default()
    } else {
        stepguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let resolved =
        stepguard_settings::resolve_config(cfg, input.overrides).context("resolve config")?;

    let total_steps = resolved.engine.total_steps;
    if let Target::Step(number) = input.target
        && !(1..=total_steps).contains(&number)
    {
        anyhow::bail!("please specify a valid step number (1-{total_steps}) or use --all");
    }

    let catalog = Catalog::open(
        resolved.catalog.clone(),
        &IndexOptions {
            include: resolved.include.clone(),
            exclude: resolved.exclude.clone(),
            resource_files: resolved.resource_files.clone(),
        },
    )
    .with_context(|| format!("open catalog {}", resolved.catalog))?;

    let oracles = build_oracles(&resolved.state, resolved.timeout).context("set up state source")?;

    let mut ctx = CallContext::new();
    if let Some(deadline) = resolved.deadline {
        ctx = ctx.with_timeout(deadline);
    }
    if let Some(cancel) = input.cancel {
        ctx = ctx.with_cancel(cancel);
    }

    let validator = Validator::new(
        &catalog,
        oracles.resources.as_ref(),
        oracles.stacks.as_ref(),
        resolved.engine,
    )
    .with_custom_rules(input.custom_rules)
    .with_context(ctx);

    let payload = match input.target {
        Target::Step(number) => ReportPayload::Step(
            validator
                .validate_step(number)
                .with_context(|| format!("validate step {number}"))?,
        ),
        Target::All => ReportPayload::Summary(validator.validate_all_steps()),
    };

    let verdict = verdict_for(&payload, resolved.fail_on);
    info!(verdict = ?verdict, "validation finished");

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: ids::TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        verdict,
        data: payload,
    };

    Ok(ValidateOutput {
        report,
        resolved_config: resolved,
    })
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}

/// A step that did not pass cleanly is a warning unless it failed; `fail_on = "warning"`
/// promotes warnings to failures.
fn verdict_for(payload: &ReportPayload, fail_on: FailOn) -> Verdict {
    let verdict = match payload {
        ReportPayload::Step(result) => match result.status {
            StepStatus::Passed => Verdict::Pass,
            StepStatus::Failed => Verdict::Fail,
            StepStatus::Warning | StepStatus::Skipped | StepStatus::Pending => Verdict::Warn,
        },
        ReportPayload::Summary(summary) => {
            if summary.failed_steps > 0 {
                Verdict::Fail
            } else if summary.warning_steps > 0 || summary.skipped_steps > 0 {
                Verdict::Warn
            } else {
                Verdict::Pass
            }
        }
    };
    match (verdict, fail_on) {
        (Verdict::Warn, FailOn::Warning) => Verdict::Fail,
        (v, _) => v,
    }
}

struct Oracles {
    resources: Box<dyn ResourceOracle>,
    stacks: Box<dyn StackOracle>,
}

fn build_oracles(state: &StateSource, timeout: Duration) -> anyhow::Result<Oracles> {
    match state {
        StateSource::Empty => Ok(Oracles {
            resources: Box::new(OracleRegistry::new()),
            stacks: Box::new(NoStacks),
        }),
        StateSource::Snapshot(path) => {
            let snapshot = Snapshot::load(path)?;
            info!(path = %path, resources = snapshot.resource_count(), stacks = snapshot.stacks.len(), "loaded state snapshot");
            let mut registry = OracleRegistry::new();
            snapshot.register_into(&mut registry);
            Ok(Oracles {
                resources: Box::new(registry),
                stacks: Box::new(snapshot),
            })
        }
        StateSource::Endpoint(url) => {
            let oracle = HttpOracle::new(url, timeout)?;
            Ok(Oracles {
                resources: Box::new(oracle.clone()),
                stacks: Box::new(oracle),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::{Utf8Path, Utf8PathBuf};
    use stepguard_types::{ErrorKind, ResourceStatus, ValidationResult, ValidationSummary};
    use tempfile::TempDir;

    fn utf8_root(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path")
    }

    fn write_file(path: &Utf8Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write file");
    }

    /// Two-step catalog plus a snapshot in which step 1 passes and step 2 is missing its stack.
    fn fixture(tmp: &TempDir) -> String {
        let root = utf8_root(tmp);
        write_file(
            &root.join("catalog/steps/step1.yaml"),
            r#"
name: Network
resources:
  - type: AWS::EC2::VPC
    identifier: sbcntr-vpc
    name: sbcntr-vpc
    required: true
    validation_rules: [vpc-cidr]
"#,
        );
        write_file(
            &root.join("catalog/steps/step2.yaml"),
            r#"
name: Registry
resources:
  - type: AWS::ECR::Repository
    identifier: sbcntr-backend
    required: false
cloudformation_stacks: [sbcntr-ecr]
"#,
        );
        write_file(
            &root.join("catalog/resources/vpc.yaml"),
            r#"
type: AWS::EC2::VPC
validation_rules:
  - name: vpc-cidr
    type: property
    property: CidrBlock
    operator: eq
    expected: 10.0.0.0/16
    severity: error
"#,
        );
        write_file(
            &root.join("state.json"),
            r#"{ "resources": { "AWS::EC2::VPC": { "sbcntr-vpc": { "CidrBlock": "10.0.0.0/16" } } } }"#,
        );
        format!(
            "catalog = '{}'\nstate = '{}'\ntotal_steps = 2\n",
            root.join("catalog"),
            root.join("state.json")
        )
    }

    fn input(config_text: &str, target: Target) -> ValidateInput<'_> {
        ValidateInput {
            config_text,
            overrides: Overrides::default(),
            target,
            custom_rules: CustomRules::new(),
            cancel: None,
        }
    }

    fn step_result(report: &StepguardReport) -> &ValidationResult {
        match &report.data {
            ReportPayload::Step(result) => result,
            other => panic!("expected step payload, got {other:?}"),
        }
    }

    fn summary(report: &StepguardReport) -> &ValidationSummary {
        match &report.data {
            ReportPayload::Summary(summary) => summary,
            other => panic!("expected summary payload, got {other:?}"),
        }
    }

    #[test]
    fn passing_step_produces_pass_report() {
        let tmp = TempDir::new().expect("temp dir");
        let cfg = fixture(&tmp);

        let output = run_validate(input(&cfg, Target::Step(1))).expect("run_validate");
        let report = &output.report;
        assert_eq!(report.schema, SCHEMA_REPORT_V1);
        assert_eq!(report.tool.name, "stepguard");
        assert_eq!(report.verdict, Verdict::Pass);
        assert!(report.finished_at >= report.started_at);

        let result = step_result(report);
        assert_eq!(result.status, StepStatus::Passed);
        assert_eq!(result.resources[0].status, ResourceStatus::Exists);
        assert_eq!(verdict_exit_code(report.verdict), 0);
    }

    #[test]
    fn missing_stack_fails_step() {
        let tmp = TempDir::new().expect("temp dir");
        let cfg = fixture(&tmp);

        let output = run_validate(input(&cfg, Target::Step(2))).expect("run_validate");
        let result = step_result(&output.report);
        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::ResourceNotFound);
        assert_eq!(output.report.verdict, Verdict::Fail);
        assert_eq!(verdict_exit_code(output.report.verdict), 2);
    }

    #[test]
    fn all_steps_produce_summary() {
        let tmp = TempDir::new().expect("temp dir");
        let cfg = fixture(&tmp);

        let output = run_validate(input(&cfg, Target::All)).expect("run_validate");
        let summary = summary(&output.report);
        assert_eq!(summary.total_steps, 2);
        assert_eq!(summary.passed_steps, 1);
        assert_eq!(summary.failed_steps, 1);
        assert_eq!(summary.results.len(), 2);
        assert_eq!(output.report.verdict, Verdict::Fail);
    }

    #[test]
    fn unloadable_steps_are_skipped_with_warn_verdict() {
        let tmp = TempDir::new().expect("temp dir");
        let cfg = fixture(&tmp).replace("total_steps = 2", "total_steps = 3");
        // Only step 1 can pass; drop step 2 so the run is not failing.
        std::fs::remove_file(utf8_root(&tmp).join("catalog/steps/step2.yaml")).expect("remove");

        let output = run_validate(input(&cfg, Target::All)).expect("run_validate");
        let summary = summary(&output.report);
        assert_eq!(summary.passed_steps, 1);
        assert_eq!(summary.skipped_steps, 2);
        assert_eq!(output.report.verdict, Verdict::Warn);
        assert_eq!(verdict_exit_code(output.report.verdict), 0);
    }

    #[test]
    fn fail_on_warning_promotes_warnings() {
        let tmp = TempDir::new().expect("temp dir");
        let cfg = fixture(&tmp).replace("total_steps = 2", "total_steps = 3");
        std::fs::remove_file(utf8_root(&tmp).join("catalog/steps/step2.yaml")).expect("remove");

        let mut input = input(&cfg, Target::All);
        input.overrides.fail_on = Some("warning".to_string());
        let output = run_validate(input).expect("run_validate");
        assert_eq!(output.report.verdict, Verdict::Fail);
    }

    #[test]
    fn step_out_of_range_is_rejected() {
        let tmp = TempDir::new().expect("temp dir");
        let cfg = fixture(&tmp);

        for number in [0, 3] {
            let err = run_validate(input(&cfg, Target::Step(number))).unwrap_err();
            assert!(
                err.to_string().contains("valid step number (1-2)"),
                "unexpected error: {err}"
            );
        }
    }

    #[test]
    fn undefined_step_is_an_error() {
        let tmp = TempDir::new().expect("temp dir");
        let cfg = fixture(&tmp).replace("total_steps = 2", "total_steps = 4");

        let err = run_validate(input(&cfg, Target::Step(4))).unwrap_err();
        assert!(format!("{err:#}").contains("step 4 is not defined"));
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let err = run_validate(input(
            "catalog = '/definitely/not/here'\n",
            Target::All,
        ))
        .unwrap_err();
        assert!(format!("{err:#}").contains("open catalog"));
    }

    #[test]
    fn without_state_everything_is_not_found() {
        let tmp = TempDir::new().expect("temp dir");
        let root = utf8_root(&tmp);
        fixture(&tmp);
        let cfg = format!("catalog = '{}'\ntotal_steps = 2\n", root.join("catalog"));

        let output = run_validate(input(&cfg, Target::Step(1))).expect("run_validate");
        let result = step_result(&output.report);
        assert_eq!(result.resources[0].status, ResourceStatus::NotFound);
        assert_eq!(result.status, StepStatus::Failed);
    }

    #[test]
    fn canceled_run_checks_nothing() {
        let tmp = TempDir::new().expect("temp dir");
        let cfg = fixture(&tmp);
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut input = input(&cfg, Target::Step(1));
        input.cancel = Some(cancel);
        let output = run_validate(input).expect("run_validate");
        let result = step_result(&output.report);
        assert_eq!(result.resources[0].status, ResourceStatus::NotFound);
        assert!(result.resources[0].errors[0].contains("canceled"));
    }

    #[test]
    fn verdict_exit_codes() {
        assert_eq!(verdict_exit_code(Verdict::Pass), 0);
        assert_eq!(verdict_exit_code(Verdict::Warn), 0);
        assert_eq!(verdict_exit_code(Verdict::Fail), 2);
    }
}
