//! CLI entry point for stepguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, logging setup, and exit
//! codes. All business logic lives in the `stepguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{ArgAction, Parser, Subcommand};
use stepguard_app::{
    ExplainOutput, OutputFormat, Target, ValidateInput, parse_report_json, render_report,
    run_explain, run_validate, serialize_report, verdict_exit_code,
};
use stepguard_domain::CustomRules;
use stepguard_settings::Overrides;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "stepguard",
    version,
    about = "Step-by-step validator for live infrastructure against declarative expectations"
)]
struct Cli {
    /// Path to stepguard config TOML (missing file means defaults).
    #[arg(long, default_value = "stepguard.toml", global = true)]
    config: Utf8PathBuf,

    /// Override the catalog root directory.
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Read resource state from a JSON snapshot.
    #[arg(long, global = true)]
    state: Option<String>,

    /// Read resource state from an HTTP endpoint.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Override the number of steps covered by --all.
    #[arg(long, global = true)]
    total_steps: Option<u32>,

    /// Resources of one step evaluated concurrently.
    #[arg(long, global = true)]
    workers: Option<u32>,

    /// Per-call timeout for state lookups, in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Deadline for the whole run, in milliseconds.
    #[arg(long, global = true)]
    deadline_ms: Option<u64>,

    /// Exit non-zero on warnings too (error|warning).
    #[arg(long, global = true)]
    fail_on: Option<String>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate one step or every step.
    Validate {
        /// Step number to validate.
        #[arg(long, short, required_unless_present = "all", conflicts_with = "all")]
        step: Option<u32>,

        /// Validate all steps.
        #[arg(long, short)]
        all: bool,

        /// Output format on stdout (console|json|markdown).
        #[arg(long, short, default_value = "console")]
        output: String,

        /// Also write the JSON report to this path.
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,
    },

    /// Render Markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long)]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Explain an error code or rule kind with remediation guidance.
    Explain {
        /// The error code (e.g. "resource_not_found") or rule kind (e.g. "count") to explain.
        identifier: String,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and succeed; usage errors are runtime errors.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_tracing(cli.verbose);

    let result = match &cli.cmd {
        Commands::Validate {
            step,
            all,
            output,
            report_out,
        } => cmd_validate(&cli, *step, *all, output, report_out.as_deref()),
        Commands::Md { report, output } => cmd_md(report, output.as_deref()),
        Commands::Explain { identifier } => cmd_explain(identifier),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("stepguard error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn cmd_validate(
    cli: &Cli,
    step: Option<u32>,
    all: bool,
    output: &str,
    report_out: Option<&Utf8Path>,
) -> anyhow::Result<i32> {
    let format: OutputFormat = output.parse()?;
    let target = match (step, all) {
        (_, true) => Target::All,
        (Some(number), false) => Target::Step(number),
        (None, false) => anyhow::bail!("please specify a valid step number or use --all"),
    };

    let config_text = read_config(&cli.config)?;
    let overrides = Overrides {
        catalog: cli.catalog.clone(),
        state: cli.state.clone(),
        endpoint: cli.endpoint.clone(),
        total_steps: cli.total_steps,
        workers: cli.workers,
        timeout_ms: cli.timeout_ms,
        deadline_ms: cli.deadline_ms,
        fail_on: cli.fail_on.clone(),
    };

    let output = run_validate(ValidateInput {
        config_text: &config_text,
        overrides,
        target,
        custom_rules: CustomRules::new(),
        cancel: None,
    })?;

    if let Some(path) = report_out {
        write_report_file(path, &serialize_report(&output.report)?).context("write report json")?;
    }
    print!("{}", render_report(&output.report, format)?);

    Ok(verdict_exit_code(output.report.verdict))
}

/// A missing config file is allowed (defaults apply); any other read failure is not.
fn read_config(path: &Utf8Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path, "no config file, using defaults");
            Ok(String::new())
        }
        Err(err) => Err(err).with_context(|| format!("read config: {path}")),
    }
}

fn write_report_file(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, data).with_context(|| format!("write report: {path}"))?;
    Ok(())
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<i32> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {report_path}"))?;
    let report = parse_report_json(&report_text)?;
    let md = render_report(&report, OutputFormat::Markdown)?;

    match output {
        Some(out_path) => {
            write_report_file(out_path, md.as_bytes()).context("write markdown output")?
        }
        None => print!("{md}"),
    }
    Ok(0)
}

fn cmd_explain(identifier: &str) -> anyhow::Result<i32> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", stepguard_app::format_explanation(&exp));
            Ok(0)
        }
        ExplainOutput::NotFound {
            identifier,
            available_codes,
            available_rule_kinds,
        } => {
            eprint!(
                "{}",
                stepguard_app::format_not_found(&identifier, available_codes, available_rule_kinds)
            );
            Ok(1)
        }
    }
}
