use crate::discover::index_rule_files;
use crate::doc::{RuleFile, StepFile};
use crate::error::CatalogError;
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use stepguard_domain::model::{StepDefinition, ValidationRule};
use stepguard_domain::ports::{CallContext, ConfigError, ConfigProvider};
use tracing::{debug, warn};

/// How rule files are found under `<root>/resources`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexOptions {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Explicit type -> file (relative to `<root>/resources`); wins over the scanned index.
    pub resource_files: BTreeMap<String, Utf8PathBuf>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            include: vec!["**/*.yaml".to_string(), "**/*.yml".to_string()],
            exclude: Vec::new(),
            resource_files: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct Catalog {
    root: Utf8PathBuf,
    rule_files: BTreeMap<String, Utf8PathBuf>,
    steps: RwLock<BTreeMap<u32, StepDefinition>>,
}

impl Catalog {
    pub fn open(root: impl Into<Utf8PathBuf>, options: &IndexOptions) -> Result<Self, CatalogError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CatalogError::MissingRoot(root));
        }

        let resources_root = root.join("resources");
        let mut rule_files = index_rule_files(&resources_root, &options.include, &options.exclude)?;
        for (resource_type, file) in &options.resource_files {
            rule_files.insert(resource_type.clone(), resources_root.join(file));
        }
        debug!(root = %root, rule_files = rule_files.len(), "catalog opened");

        Ok(Self {
            root,
            rule_files,
            steps: RwLock::new(BTreeMap::new()),
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn step_path(&self, number: u32) -> Utf8PathBuf {
        self.root.join("steps").join(format!("step{number}.yaml"))
    }

    pub fn rule_file(&self, resource_type: &str) -> Option<&Utf8Path> {
        self.rule_files.get(resource_type).map(|p| p.as_path())
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.rule_files.keys().map(|k| k.as_str())
    }

    /// Load a step definition, caching it after the first successful read.
    pub fn step(&self, number: u32) -> Result<StepDefinition, CatalogError> {
        if let Some(hit) = self.steps.read().get(&number) {
            return Ok(hit.clone());
        }

        let path = self.step_path(number);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CatalogError::StepNotFound(number));
            }
            Err(source) => return Err(CatalogError::Io { path, source }),
        };
        let file: StepFile = serde_yaml::from_str(&text).map_err(|source| CatalogError::Yaml {
            path: path.clone(),
            source,
        })?;
        if let Some(declared) = file.number
            && declared != number
        {
            warn!(path = %path, declared, number, "step file declares a different number");
        }
        let step = file
            .into_definition(number)
            .map_err(|source| CatalogError::Invalid { path, source })?;

        self.steps.write().insert(number, step.clone());
        Ok(step)
    }

    /// Rules for a resource type; a type without a rule file has none.
    pub fn rules(&self, resource_type: &str) -> Result<Vec<ValidationRule>, CatalogError> {
        let Some(path) = self.rule_files.get(resource_type) else {
            debug!(resource_type = %resource_type, "no rule file for type");
            return Ok(Vec::new());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let file: RuleFile = serde_yaml::from_str(&text).map_err(|source| CatalogError::Yaml {
            path: path.clone(),
            source,
        })?;
        if file.resource_type != resource_type {
            warn!(path = %path, declared = %file.resource_type, resource_type = %resource_type, "rule file declares a different type");
        }
        file.into_rules().map_err(|source| CatalogError::Invalid {
            path: path.clone(),
            source,
        })
    }
}

impl ConfigProvider for Catalog {
    fn load_step(&self, number: u32, _ctx: &CallContext) -> Result<StepDefinition, ConfigError> {
        Ok(self.step(number)?)
    }

    fn load_rule_set(
        &self,
        resource_type: &str,
        _ctx: &CallContext,
    ) -> Result<Vec<ValidationRule>, ConfigError> {
        Ok(self.rules(resource_type)?)
    }
}
