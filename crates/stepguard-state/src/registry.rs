use std::collections::BTreeMap;
use std::fmt;
use stepguard_domain::ports::{CallContext, OracleError, ResourceOracle};
use stepguard_types::Mapping;
use tracing::debug;

/// Existence check for one resource type: identifier -> properties when present.
pub type ExistenceCheck =
    Box<dyn Fn(&str, &CallContext) -> Result<Option<Mapping>, OracleError> + Send + Sync>;

/// Existence check for any type: (type, identifier) -> properties when present.
pub type FallbackCheck =
    Box<dyn Fn(&str, &str, &CallContext) -> Result<Option<Mapping>, OracleError> + Send + Sync>;

/// Dispatch table from resource type to existence check, populated at startup.
#[derive(Default)]
pub struct OracleRegistry {
    handlers: BTreeMap<String, ExistenceCheck>,
    fallback: Option<FallbackCheck>,
}

impl OracleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the check for `resource_type`.
    pub fn register<F>(&mut self, resource_type: &str, check: F)
    where
        F: Fn(&str, &CallContext) -> Result<Option<Mapping>, OracleError> + Send + Sync + 'static,
    {
        self.handlers
            .insert(resource_type.to_string(), Box::new(check));
    }

    /// Check used for types with no registered handler.
    pub fn set_fallback<F>(&mut self, check: F)
    where
        F: Fn(&str, &str, &CallContext) -> Result<Option<Mapping>, OracleError>
            + Send
            + Sync
            + 'static,
    {
        self.fallback = Some(Box::new(check));
    }

    pub fn handles(&self, resource_type: &str) -> bool {
        self.handlers.contains_key(resource_type)
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|k| k.as_str())
    }
}

impl fmt::Debug for OracleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleRegistry")
            .field("types", &self.handlers.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ResourceOracle for OracleRegistry {
    fn check_exists(
        &self,
        resource_type: &str,
        identifier: &str,
        ctx: &CallContext,
    ) -> Result<Option<Mapping>, OracleError> {
        if let Some(check) = self.handlers.get(resource_type) {
            return check(identifier, ctx);
        }
        match &self.fallback {
            Some(check) => check(resource_type, identifier, ctx),
            None => {
                debug!(resource_type = %resource_type, "no existence check registered");
                Ok(None)
            }
        }
    }
}
