//! Stable DTOs and IDs used across the stepguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for validation results and the emitted report
//! - stable string IDs for error kinds, rule kinds and operators
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod receipt;

pub use explain::{lookup_explanation, ExamplePair, Explanation};
pub use receipt::{
    ErrorKind, Mapping, ReportEnvelope, ReportPayload, ResourceResult, ResourceStatus,
    StepStatus, StepguardReport, StructuredValue, ToolMeta, ValidationError, ValidationResult,
    ValidationSummary, ValidationWarning, Verdict, SCHEMA_REPORT_V1,
};
