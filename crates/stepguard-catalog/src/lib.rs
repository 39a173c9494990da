//! Catalog adapter: step definitions and rule sets stored as YAML on disk.
//!
//! Layout:
//! - `<root>/steps/step<N>.yaml`: one file per step
//! - `<root>/resources/**/*.yaml`: rule files, indexed by their declared `type`
//!
//! This crate is allowed to do filesystem IO.

#![forbid(unsafe_code)]

mod catalog;
mod discover;
pub mod doc;
mod error;

pub use catalog::{Catalog, IndexOptions};
pub use discover::index_rule_files;
pub use error::CatalogError;

/// Parsing entry points that never touch the filesystem.
pub mod parse {
    use crate::doc::{RuleFile, StepFile};
    use stepguard_domain::model::{StepDefinition, ValidationRule};

    /// Parse step YAML text. Never panics on any input.
    pub fn step(number: u32, text: &str) -> Result<StepDefinition, String> {
        let file: StepFile = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        file.into_definition(number).map_err(|e| e.to_string())
    }

    /// Parse rule-file YAML text. Never panics on any input.
    pub fn rules(text: &str) -> Result<Vec<ValidationRule>, String> {
        let file: RuleFile = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        file.into_rules().map_err(|e| e.to_string())
    }
}
