use crate::ids;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;

/// Stable schema identifier for stepguard reports.
pub const SCHEMA_REPORT_V1: &str = "stepguard.report.v1";

/// Any resource property document: null, bool, number, string, sequence or mapping.
pub type StructuredValue = serde_json::Value;

/// String-keyed mapping of structured values.
pub type Mapping = serde_json::Map<String, StructuredValue>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Passed,
    Failed,
    Warning,
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "PENDING",
            StepStatus::Passed => "PASSED",
            StepStatus::Failed => "FAILED",
            StepStatus::Warning => "WARNING",
            StepStatus::Skipped => "SKIPPED",
        };
        f.write_str(s)
    }
}

/// Resource status only ever moves downward while rules are applied:
/// `NotFound` -> `Exists` -> `Misconfigured`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    NotFound,
    Exists,
    Misconfigured,
    Pending,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceStatus::NotFound => "NOT_FOUND",
            ResourceStatus::Exists => "EXISTS",
            ResourceStatus::Misconfigured => "MISCONFIGURED",
            ResourceStatus::Pending => "PENDING",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ResourceNotFound,
    PropertyMismatch,
    ConfigurationInvalid,
    UpstreamApiFailure,
    AuthenticationFailure,
    PermissionDenied,
    NetworkFailure,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::ResourceNotFound,
        ErrorKind::PropertyMismatch,
        ErrorKind::ConfigurationInvalid,
        ErrorKind::UpstreamApiFailure,
        ErrorKind::AuthenticationFailure,
        ErrorKind::PermissionDenied,
        ErrorKind::NetworkFailure,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ResourceNotFound => ids::CODE_RESOURCE_NOT_FOUND,
            ErrorKind::PropertyMismatch => ids::CODE_PROPERTY_MISMATCH,
            ErrorKind::ConfigurationInvalid => ids::CODE_CONFIGURATION_INVALID,
            ErrorKind::UpstreamApiFailure => ids::CODE_UPSTREAM_API_FAILURE,
            ErrorKind::AuthenticationFailure => ids::CODE_AUTHENTICATION_FAILURE,
            ErrorKind::PermissionDenied => ids::CODE_PERMISSION_DENIED,
            ErrorKind::NetworkFailure => ids::CODE_NETWORK_FAILURE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of checking one declared resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceResult {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    pub name: String,
    pub status: ResourceStatus,
    /// Rule property path -> expected value, for every rule that was applied.
    #[schemars(with = "std::collections::BTreeMap<String, serde_json::Value>")]
    pub expected: Mapping,
    /// Properties reported by the resource-state oracle.
    #[schemars(with = "std::collections::BTreeMap<String, serde_json::Value>")]
    pub actual: Mapping,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ResourceResult {
    pub fn not_found(resource_type: &str, id: &str, name: &str) -> Self {
        Self {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            name: name.to_string(),
            status: ResourceStatus::NotFound,
            expected: Mapping::new(),
            actual: Mapping::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_failing(&self) -> bool {
        matches!(
            self.status,
            ResourceStatus::NotFound | ResourceStatus::Misconfigured
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<StructuredValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<StructuredValue>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ref: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationWarning {
    pub resource: String,
    pub message: String,
}

/// Result of validating a single step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub step_number: u32,
    pub step_name: String,
    pub status: StepStatus,
    pub resources: Vec<ResourceResult>,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    #[schemars(with = "u64")]
    pub duration: Duration,
}

impl ValidationResult {
    pub fn new(step_number: u32, step_name: &str) -> Self {
        Self {
            step_number,
            step_name: step_name.to_string(),
            status: StepStatus::Pending,
            resources: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            duration: Duration::ZERO,
        }
    }
}

/// Run-level rollup over every step that could be loaded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationSummary {
    pub total_steps: u32,
    pub passed_steps: u32,
    pub failed_steps: u32,
    pub warning_steps: u32,
    pub skipped_steps: u32,
    pub results: Vec<ValidationResult>,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// What a report carries: one step or the whole run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(clippy::large_enum_variant)]
pub enum ReportPayload {
    Step(ValidationResult),
    Summary(ValidationSummary),
}

/// A generic receipt/envelope.
///
/// Keeping this generic keeps the outer shape stable while the payload evolves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = ReportPayload> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub verdict: Verdict,
    pub data: TData,
}

pub type StepguardReport = ReportEnvelope<ReportPayload>;
