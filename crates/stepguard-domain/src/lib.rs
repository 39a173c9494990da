//! Pure rule evaluation and status aggregation (no IO).
//!
//! Input: step definitions and rule sets from a [`ports::ConfigProvider`], resource state from a
//! [`ports::ResourceOracle`], stack existence from a [`ports::StackOracle`].
//! Output: per-step [`stepguard_types::ValidationResult`]s and a run-level
//! [`stepguard_types::ValidationSummary`].

#![forbid(unsafe_code)]

pub mod cache;
pub mod model;
pub mod path;
pub mod ports;
pub mod resource;
pub mod rules;
pub mod step;

mod engine;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use engine::{EngineOptions, Validator};
pub use path::{Resolved, resolve};
pub use rules::{CustomRules, Evaluator, RuleFailure, evaluate};
