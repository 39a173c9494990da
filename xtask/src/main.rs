//! Developer tasks (schema generation, conformance checks).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use stepguard_test_util::normalize_nondeterministic;

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));

    // If we're in the xtask directory, go up one level
    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(manifest_dir)
    } else {
        manifest_dir
    }
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(stepguard_types::StepguardReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(stepguard_settings::StepguardConfigV1)
}

fn generate_rules_schema() -> schemars::Schema {
    schema_for!(stepguard_catalog::doc::RuleFile)
}

fn generate_step_schema() -> schemars::Schema {
    schema_for!(stepguard_catalog::doc::StepFile)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "stepguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "stepguard.config.v1.json",
            generate: generate_config_schema,
        },
        SchemaSpec {
            filename: "stepguard.rules.v1.json",
            generate: generate_rules_schema,
        },
        SchemaSpec {
            filename: "stepguard.step.v1.json",
            generate: generate_step_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Check that schemas in the repo match what would be generated.
fn check_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {name}");
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {name}");
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema check failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  check-schemas     Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Run the stepguard binary on fixtures and compare golden reports");
    eprintln!("  explain-coverage  Validate all error codes and rule kinds have explanations");
}

/// Golden files are named `expected.step<N>.report.json`; returns N.
fn golden_step(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("expected.step")?
        .strip_suffix(".report.json")?
        .parse()
        .ok()
}

/// Run the built binary on every fixture with a `stepguard.toml` and check each golden report:
/// the output must validate against the report schema and match the golden file once
/// timestamps, durations and the tool version are normalized.
fn conform() -> anyhow::Result<()> {
    let schema = serde_json::to_value(generate_report_schema())?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile report schema: {e}"))?;

    let bin = project_root().join("target").join("debug").join("stepguard");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");
    if !bin.exists() {
        bail!(
            "stepguard binary not found at {}.\nRun `cargo build -p stepguard-cli` first.",
            bin.display()
        );
    }

    let fixtures_dir = project_root().join("tests").join("fixtures");
    let mut errors = Vec::new();
    let mut checked = 0usize;

    for entry in fs::read_dir(&fixtures_dir).context("Failed to read tests/fixtures/")? {
        let fixture_dir = entry?.path();
        if !fixture_dir.join("stepguard.toml").exists() {
            continue;
        }
        let fixture_name = fixture_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut goldens = Vec::new();
        for file in fs::read_dir(&fixture_dir)? {
            let path = file?.path();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if let Some(step) = golden_step(&name) {
                goldens.push((step, path));
            }
        }
        goldens.sort();

        for (step, golden_path) in goldens {
            let output = std::process::Command::new(&bin)
                .current_dir(&fixture_dir)
                .args(["validate", "--step", &step.to_string(), "--output", "json"])
                .output()
                .with_context(|| format!("Failed to run stepguard on fixture '{fixture_name}'"))?;
            if output.status.code() == Some(1) {
                errors.push(format!(
                    "fixture '{fixture_name}' step {step}: runtime error: {}",
                    String::from_utf8_lossy(&output.stderr)
                ));
                continue;
            }

            let report: serde_json::Value = serde_json::from_slice(&output.stdout)
                .with_context(|| format!("Failed to parse report for fixture '{fixture_name}'"))?;
            for err in validator.iter_errors(&report) {
                errors.push(format!(
                    "fixture '{fixture_name}' step {step}: schema validation: {err}"
                ));
            }

            let golden: serde_json::Value = serde_json::from_str(
                &fs::read_to_string(&golden_path)
                    .with_context(|| format!("Failed to read {}", golden_path.display()))?,
            )?;
            if normalize_nondeterministic(report) != normalize_nondeterministic(golden) {
                errors.push(format!(
                    "fixture '{fixture_name}' step {step}: output differs from {}",
                    golden_path.display()
                ));
            } else {
                println!("  ✓ fixture '{fixture_name}' step {step} matches golden report");
            }
            checked += 1;
        }
    }

    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Conformance failed with {} errors", errors.len());
    }
    println!("\n✓ {checked} golden reports conform.");
    Ok(())
}

fn explain_coverage() -> anyhow::Result<()> {
    use stepguard_types::explain;

    let mut errors = Vec::new();
    let ids = explain::all_error_codes()
        .iter()
        .chain(explain::all_rule_kinds());
    for id in ids {
        match explain::lookup_explanation(id) {
            Some(exp) => {
                if exp.title.is_empty() {
                    errors.push(format!("'{id}' has empty title"));
                }
                if exp.description.is_empty() {
                    errors.push(format!("'{id}' has empty description"));
                }
                if exp.remediation.is_empty() {
                    errors.push(format!("'{id}' has empty remediation"));
                }
            }
            None => errors.push(format!("'{id}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!(
            "✓ {} error codes have explanations",
            explain::all_error_codes().len()
        );
        println!(
            "✓ {} rule kinds have explanations",
            explain::all_rule_kinds().len()
        );
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {error}");
    }
    bail!(
        "Explain coverage validation failed with {} errors",
        errors.len()
    )
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "check-schemas" | "validate-schemas" => check_schemas(),
        "conform" => conform(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            println!("{}", stepguard_types::SCHEMA_REPORT_V1);
            println!("{}", stepguard_settings::SCHEMA_CONFIG_V1);
            println!("{}", stepguard_catalog::doc::SCHEMA_RULES_V1);
            for spec in schema_specs() {
                println!("{}", spec.filename);
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_file_names_carry_step_number() {
        assert_eq!(golden_step("expected.step3.report.json"), Some(3));
        assert_eq!(golden_step("expected.report.json"), None);
        assert_eq!(golden_step("expected.stepx.report.json"), None);
    }

    #[test]
    fn every_schema_serializes() {
        for spec in schema_specs() {
            let json = serialize_schema(&(spec.generate)()).expect("serialize");
            assert!(json.ends_with('\n'), "{}", spec.filename);
        }
    }
}
