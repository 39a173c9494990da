use crate::model::StepguardConfigV1;
use anyhow::Context;
use camino::Utf8PathBuf;
use globset::Glob;
use std::collections::BTreeMap;
use std::time::Duration;
use stepguard_domain::EngineOptions;

pub const DEFAULT_CATALOG: &str = "catalog";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.yaml", "**/*.yml"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailOn {
    #[default]
    Error,
    Warning,
}

/// Where resource state comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateSource {
    /// No state provider configured: every resource is reported as not found.
    Empty,
    Snapshot(Utf8PathBuf),
    Endpoint(String),
}

/// Command-line values that win over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub catalog: Option<String>,
    pub state: Option<String>,
    pub endpoint: Option<String>,
    pub total_steps: Option<u32>,
    pub workers: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub deadline_ms: Option<u64>,
    pub fail_on: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub engine: EngineOptions,
    pub catalog: Utf8PathBuf,
    pub state: StateSource,
    pub fail_on: FailOn,
    pub timeout: Duration,
    pub deadline: Option<Duration>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub resource_files: BTreeMap<String, Utf8PathBuf>,
}

pub fn resolve_config(
    cfg: StepguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref()
        && schema != crate::SCHEMA_CONFIG_V1
    {
        anyhow::bail!(
            "unsupported config schema: {schema} (expected {})",
            crate::SCHEMA_CONFIG_V1
        );
    }

    let catalog = overrides
        .catalog
        .clone()
        .or(cfg.catalog.clone())
        .unwrap_or_else(|| DEFAULT_CATALOG.to_string());

    // A state source given on the command line replaces the file's, whichever kind it is.
    let state = if overrides.state.is_some() || overrides.endpoint.is_some() {
        parse_state(overrides.state.clone(), overrides.endpoint.clone())
            .context("invalid state override")?
    } else {
        parse_state(cfg.state.clone(), cfg.endpoint.clone()).context("invalid state config")?
    };

    let total_steps = overrides.total_steps.or(cfg.total_steps).unwrap_or(6);
    if total_steps == 0 {
        anyhow::bail!("total_steps must be at least 1");
    }

    let workers = overrides.workers.or(cfg.workers).unwrap_or(1);
    if workers == 0 {
        anyhow::bail!("workers must be at least 1");
    }

    let timeout_ms = overrides
        .timeout_ms
        .or(cfg.timeout_ms)
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    if timeout_ms == 0 {
        anyhow::bail!("timeout_ms must be greater than 0");
    }

    let fail_on = match overrides.fail_on.as_deref().or(cfg.fail_on.as_deref()) {
        Some(v) => parse_fail_on(v)?,
        None => FailOn::Error,
    };

    let include = if cfg.catalog_options.include.is_empty() {
        DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect()
    } else {
        cfg.catalog_options.include.clone()
    };
    validate_globs("include", &include)?;
    validate_globs("exclude", &cfg.catalog_options.exclude)?;

    let resource_files = cfg
        .resource_files
        .into_iter()
        .map(|(ty, file)| (ty, Utf8PathBuf::from(file)))
        .collect();

    Ok(ResolvedConfig {
        engine: EngineOptions {
            total_steps,
            workers: workers as usize,
        },
        catalog: Utf8PathBuf::from(catalog),
        state,
        fail_on,
        timeout: Duration::from_millis(timeout_ms),
        deadline: overrides
            .deadline_ms
            .or(cfg.deadline_ms)
            .map(Duration::from_millis),
        include,
        exclude: cfg.catalog_options.exclude,
        resource_files,
    })
}

fn parse_state(snapshot: Option<String>, endpoint: Option<String>) -> anyhow::Result<StateSource> {
    match (snapshot, endpoint) {
        (Some(_), Some(_)) => anyhow::bail!("state and endpoint are mutually exclusive"),
        (Some(path), None) => Ok(StateSource::Snapshot(Utf8PathBuf::from(path))),
        (None, Some(url)) => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("endpoint must be an http(s) URL: {url}");
            }
            Ok(StateSource::Endpoint(url.trim_end_matches('/').to_string()))
        }
        (None, None) => Ok(StateSource::Empty),
    }
}

fn validate_globs(what: &str, patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid {what} glob: {pattern}"))?;
    }
    Ok(())
}

pub fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_toml;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let resolved = resolve_config(StepguardConfigV1::default(), Overrides::default())
            .expect("resolve");
        assert_eq!(resolved.engine, EngineOptions::default());
        assert_eq!(resolved.catalog, Utf8PathBuf::from("catalog"));
        assert_eq!(resolved.state, StateSource::Empty);
        assert_eq!(resolved.fail_on, FailOn::Error);
        assert_eq!(resolved.timeout, Duration::from_secs(30));
        assert_eq!(resolved.deadline, None);
        assert_eq!(resolved.include, vec!["**/*.yaml", "**/*.yml"]);
    }

    #[test]
    fn file_values_are_applied() {
        let cfg = parse_config_toml(
            r#"
schema = "stepguard.config.v1"
catalog = "handbook"
state = "state.json"
total_steps = 8
fail_on = "warning"
workers = 4
timeout_ms = 500
deadline_ms = 10000

[catalog_options]
include = ["rules/*.yaml"]

[resource_files]
"AWS::EC2::VPC" = "vpc.yaml"
"#,
        )
        .expect("parse");
        let resolved = resolve_config(cfg, Overrides::default()).expect("resolve");
        assert_eq!(resolved.engine.total_steps, 8);
        assert_eq!(resolved.engine.workers, 4);
        assert_eq!(resolved.catalog, Utf8PathBuf::from("handbook"));
        assert_eq!(resolved.state, StateSource::Snapshot(Utf8PathBuf::from("state.json")));
        assert_eq!(resolved.fail_on, FailOn::Warning);
        assert_eq!(resolved.timeout, Duration::from_millis(500));
        assert_eq!(resolved.deadline, Some(Duration::from_secs(10)));
        assert_eq!(resolved.include, vec!["rules/*.yaml"]);
        assert_eq!(
            resolved.resource_files.get("AWS::EC2::VPC"),
            Some(&Utf8PathBuf::from("vpc.yaml"))
        );
    }

    #[test]
    fn overrides_win() {
        let cfg = StepguardConfigV1 {
            state: Some("state.json".to_string()),
            workers: Some(2),
            fail_on: Some("warning".to_string()),
            ..StepguardConfigV1::default()
        };
        let overrides = Overrides {
            endpoint: Some("http://127.0.0.1:8080/".to_string()),
            workers: Some(8),
            fail_on: Some("error".to_string()),
            ..Overrides::default()
        };
        let resolved = resolve_config(cfg, overrides).expect("resolve");
        assert_eq!(
            resolved.state,
            StateSource::Endpoint("http://127.0.0.1:8080".to_string())
        );
        assert_eq!(resolved.engine.workers, 8);
        assert_eq!(resolved.fail_on, FailOn::Error);
    }

    #[test]
    fn rejects_invalid_values() {
        let bad = [
            StepguardConfigV1 {
                workers: Some(0),
                ..StepguardConfigV1::default()
            },
            StepguardConfigV1 {
                total_steps: Some(0),
                ..StepguardConfigV1::default()
            },
            StepguardConfigV1 {
                fail_on: Some("sometimes".to_string()),
                ..StepguardConfigV1::default()
            },
            StepguardConfigV1 {
                schema: Some("stepguard.config.v9".to_string()),
                ..StepguardConfigV1::default()
            },
            StepguardConfigV1 {
                state: Some("s.json".to_string()),
                endpoint: Some("http://x".to_string()),
                ..StepguardConfigV1::default()
            },
            StepguardConfigV1 {
                endpoint: Some("ftp://x".to_string()),
                ..StepguardConfigV1::default()
            },
        ];
        for cfg in bad {
            assert!(
                resolve_config(cfg.clone(), Overrides::default()).is_err(),
                "{cfg:?}"
            );
        }
    }

    #[test]
    fn rejects_invalid_globs() {
        let mut cfg = StepguardConfigV1::default();
        cfg.catalog_options.include = vec!["rules/[".to_string()];
        let err = resolve_config(cfg, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("invalid include glob"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = parse_config_toml("future_key = true\nworkers = 3\n").expect("parse");
        assert_eq!(cfg.workers, Some(3));
    }
}
