//! Collaborator interfaces the engine calls out to.
//!
//! The engine never performs I/O itself; adapters implement these traits.

use crate::model::{StepDefinition, ValidationRule};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use stepguard_types::{ErrorKind, Mapping};

/// Cooperative cancellation flag shared between the caller and the engine.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Deadline and cancellation handed to every collaborator call.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    pub deadline: Option<Instant>,
    pub cancel: CancelToken,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// True once canceled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.cancel.is_canceled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Time left before the deadline; `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// The smaller of `per_call` and the time left.
    pub fn bounded(&self, per_call: Duration) -> Duration {
        match self.remaining() {
            Some(left) => left.min(per_call),
            None => per_call,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("step {0} is not defined")]
    StepNotFound(u32),
    #[error("failed to read {what}: {reason}")]
    Unreadable { what: String, reason: String },
    #[error("invalid {what}: {reason}")]
    Invalid { what: String, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("canceled")]
    Canceled,
    #[error("upstream API error: {0}")]
    Upstream(String),
}

impl OracleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::Authentication(_) => ErrorKind::AuthenticationFailure,
            OracleError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            OracleError::Network(_) | OracleError::Timeout(_) | OracleError::Canceled => {
                ErrorKind::NetworkFailure
            }
            OracleError::Upstream(_) => ErrorKind::UpstreamApiFailure,
        }
    }
}

/// Source of step definitions and per-resource-type rule sets.
pub trait ConfigProvider: Send + Sync {
    fn load_step(&self, number: u32, ctx: &CallContext) -> Result<StepDefinition, ConfigError>;

    /// Rule set for a resource type. A type with no rules yields an empty set.
    fn load_rule_set(
        &self,
        resource_type: &str,
        ctx: &CallContext,
    ) -> Result<Vec<ValidationRule>, ConfigError>;
}

/// Existence check for one resource: `Ok(None)` when absent, `Ok(Some(props))` when present.
pub trait ResourceOracle: Send + Sync {
    fn check_exists(
        &self,
        resource_type: &str,
        identifier: &str,
        ctx: &CallContext,
    ) -> Result<Option<Mapping>, OracleError>;
}

pub trait StackOracle: Send + Sync {
    fn stack_exists(&self, name: &str, ctx: &CallContext) -> Result<bool, OracleError>;
}
