//! Use case orchestration for stepguard.
//!
//! This crate provides the application layer: use cases that coordinate the settings, catalog,
//! state, domain, and render layers. It is intentionally thin and delegates heavy lifting to the
//! appropriate layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod explain;
mod render;
mod report;
mod validate;

pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use render::{OutputFormat, render_report};
pub use report::{parse_report_json, serialize_report, to_renderable};
pub use validate::{Target, ValidateInput, ValidateOutput, run_validate, verdict_exit_code};
