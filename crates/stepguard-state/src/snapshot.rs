use crate::registry::OracleRegistry;
use anyhow::Context;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use stepguard_domain::ports::{CallContext, OracleError, StackOracle};
use stepguard_types::Mapping;

/// Known resources and stacks captured as one JSON document:
///
/// ```json
/// { "resources": { "AWS::EC2::VPC": { "sbcntr-vpc": { "CidrBlock": "10.0.0.0/16" } } },
///   "stacks": ["sbcntr-base"] }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub resources: BTreeMap<String, BTreeMap<String, Mapping>>,
    #[serde(default)]
    pub stacks: BTreeSet<String>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("parse state snapshot")
    }

    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
        Self::from_json(&text).with_context(|| format!("load {path}"))
    }

    /// Register one existence check per resource type.
    pub fn register_into(&self, registry: &mut OracleRegistry) {
        for (resource_type, by_id) in &self.resources {
            let by_id = Arc::new(by_id.clone());
            registry.register(resource_type, move |identifier, _ctx| {
                Ok(by_id.get(identifier).cloned())
            });
        }
    }

    pub fn resource_count(&self) -> usize {
        self.resources.values().map(BTreeMap::len).sum()
    }
}

impl StackOracle for Snapshot {
    fn stack_exists(&self, name: &str, _ctx: &CallContext) -> Result<bool, OracleError> {
        Ok(self.stacks.contains(name))
    }
}

/// Stack oracle for runs without any state source: no stack exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStacks;

impl StackOracle for NoStacks {
    fn stack_exists(&self, _name: &str, _ctx: &CallContext) -> Result<bool, OracleError> {
        Ok(false)
    }
}
