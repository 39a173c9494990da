use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `stepguard.toml` schema v1.
///
/// This is a *user-facing* config model: every key is optional and unknown keys are ignored,
/// so older binaries keep reading newer files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepguardConfigV1 {
    /// Optional schema string for tooling (`stepguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Catalog root holding `steps/` and `resources/`. Defaults to `catalog`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// JSON state snapshot answering existence and stack checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Base URL of an HTTP state endpoint (alternative to `state`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Number of steps covered by a full run. Defaults to 6.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,

    /// When to fail the run: `error` (default) or `warning`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    /// Resources of one step evaluated concurrently. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<u32>,

    /// Per oracle call timeout in milliseconds. Defaults to 30000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Whole-run deadline in milliseconds. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,

    #[serde(default)]
    pub catalog_options: CatalogOptions,

    /// Explicit resource type -> rule file (relative to `<catalog>/resources`).
    #[serde(default)]
    pub resource_files: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CatalogOptions {
    /// Globs (relative to `<catalog>/resources`) selecting rule files.
    #[serde(default)]
    pub include: Vec<String>,

    /// Globs excluded after `include`.
    #[serde(default)]
    pub exclude: Vec<String>,
}
