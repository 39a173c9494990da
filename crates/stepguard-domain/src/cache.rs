//! Per-run cache of rule sets keyed by resource type.
//!
//! Readers share a `RwLock`; loading a given key is serialized by a per-key mutex so each
//! rule set is loaded at most once even when resources are evaluated in parallel. Failed
//! loads are not cached.

use crate::model::ValidationRule;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type RuleSet = Arc<[ValidationRule]>;

#[derive(Debug, Default)]
pub struct RuleSetCache {
    ready: RwLock<BTreeMap<String, RuleSet>>,
    loading: Mutex<BTreeMap<String, Arc<Mutex<()>>>>,
}

impl RuleSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, key: &str) -> Option<RuleSet> {
        self.ready.read().get(key).cloned()
    }

    pub fn get_or_load<E, F>(&self, key: &str, load: F) -> Result<RuleSet, E>
    where
        F: FnOnce() -> Result<Vec<ValidationRule>, E>,
    {
        if let Some(hit) = self.cached(key) {
            return Ok(hit);
        }

        let slot = self
            .loading
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone();
        let _guard = slot.lock();

        // Another thread may have finished while we waited for the slot.
        if let Some(hit) = self.cached(key) {
            return Ok(hit);
        }

        let rules: RuleSet = load()?.into();
        self.ready.write().insert(key.to_string(), rules.clone());
        Ok(rules)
    }

    pub fn len(&self) -> usize {
        self.ready.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleKind, RuleSeverity};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn one_rule() -> Vec<ValidationRule> {
        vec![ValidationRule {
            name: "vpc-cidr".to_string(),
            kind: RuleKind::Property,
            property: "CidrBlock".to_string(),
            expected: serde_json::json!("10.0.0.0/16"),
            operator: None,
            error_message: String::new(),
            severity: RuleSeverity::Error,
        }]
    }

    #[test]
    fn loads_once_then_hits() {
        let cache = RuleSetCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let rules = cache
                .get_or_load::<(), _>("AWS::EC2::VPC", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(one_rule())
                })
                .expect("load");
            assert_eq!(rules.len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = RuleSetCache::new();
        let err = cache.get_or_load("AWS::EC2::VPC", || Err("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(cache.is_empty());
        let ok = cache.get_or_load::<&str, _>("AWS::EC2::VPC", || Ok(one_rule()));
        assert!(ok.is_ok());
    }

    #[test]
    fn concurrent_loads_for_one_key_run_once() {
        let cache = RuleSetCache::new();
        let calls = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    cache
                        .get_or_load::<(), _>("AWS::EC2::Subnet", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(5));
                            Ok(one_rule())
                        })
                        .expect("load");
                });
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
