use crate::cache::{RuleSet, RuleSetCache};
use crate::model::{ResourceDefinition, StepDefinition, ValidationRule};
use crate::ports::{CallContext, ConfigError, ConfigProvider, OracleError, ResourceOracle, StackOracle};
use crate::resource::{aggregate_resource, unverified_resource};
use crate::rules::{CustomRules, Evaluator};
use crate::step::{
    derive_step_status, missing_required_resource, missing_stack, rule_set_unavailable, tally,
};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use stepguard_types::{
    ResourceResult, ResourceStatus, ValidationResult, ValidationSummary, ValidationWarning,
};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Steps covered by [`Validator::validate_all_steps`], numbered from 1.
    pub total_steps: u32,
    /// Resources of one step evaluated concurrently; 1 means sequential.
    pub workers: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            total_steps: 6,
            workers: 1,
        }
    }
}

/// Step orchestrator. Holds the collaborators and the per-run rule-set cache.
pub struct Validator<'a> {
    config: &'a dyn ConfigProvider,
    resources: &'a dyn ResourceOracle,
    stacks: &'a dyn StackOracle,
    evaluator: Evaluator,
    rule_sets: RuleSetCache,
    options: EngineOptions,
    ctx: CallContext,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> Validator<'a> {
    pub fn new(
        config: &'a dyn ConfigProvider,
        resources: &'a dyn ResourceOracle,
        stacks: &'a dyn StackOracle,
        options: EngineOptions,
    ) -> Self {
        Self {
            config,
            resources,
            stacks,
            evaluator: Evaluator::default(),
            rule_sets: RuleSetCache::new(),
            options,
            ctx: CallContext::default(),
            pool: build_pool(options.workers),
        }
    }

    pub fn with_custom_rules(mut self, custom: CustomRules) -> Self {
        self.evaluator = Evaluator::new(custom);
        self
    }

    pub fn with_context(mut self, ctx: CallContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Validate one step. Only a failure to load the step definition is an error.
    pub fn validate_step(&self, number: u32) -> Result<ValidationResult, ConfigError> {
        let started = Instant::now();
        let step = self.config.load_step(number, &self.ctx)?;
        info!(step = number, name = %step.name, resources = step.resources.len(), "validating step");

        let mut result = ValidationResult::new(number, &step.name);

        for stack in &step.stacks {
            if !self.stack_present(stack) {
                result.errors.push(missing_stack(&step, stack));
            }
        }

        for (def, (resource, load_warning)) in step.resources.iter().zip(self.evaluate_resources(&step)) {
            result.warnings.extend(load_warning);
            result
                .warnings
                .extend(resource.warnings.iter().map(|message| ValidationWarning {
                    resource: def.display_name().to_string(),
                    message: message.clone(),
                }));
            if def.required && resource.status == ResourceStatus::NotFound {
                result.errors.push(missing_required_resource(&step, def));
            }
            result.resources.push(resource);
        }

        result.status = derive_step_status(&result);
        result.duration = started.elapsed();
        info!(step = number, status = %result.status, errors = result.errors.len(), warnings = result.warnings.len(), "step done");
        Ok(result)
    }

    /// Validate steps `1..=total_steps` in order. Steps that fail to load are counted as
    /// skipped and left out of the results.
    pub fn validate_all_steps(&self) -> ValidationSummary {
        let mut summary = ValidationSummary {
            total_steps: self.options.total_steps,
            ..ValidationSummary::default()
        };
        for number in 1..=self.options.total_steps {
            match self.validate_step(number) {
                Ok(result) => tally(&mut summary, result),
                Err(err) => {
                    warn!(step = number, error = %err, "skipping step");
                    summary.skipped_steps += 1;
                }
            }
        }
        summary
    }

    fn evaluate_resources(
        &self,
        step: &StepDefinition,
    ) -> Vec<(ResourceResult, Option<ValidationWarning>)> {
        match &self.pool {
            Some(pool) if step.resources.len() > 1 => pool.install(|| {
                step.resources
                    .par_iter()
                    .map(|def| self.evaluate_resource(def))
                    .collect()
            }),
            _ => step
                .resources
                .iter()
                .map(|def| self.evaluate_resource(def))
                .collect(),
        }
    }

    fn evaluate_resource(&self, def: &ResourceDefinition) -> (ResourceResult, Option<ValidationWarning>) {
        let key = def.lookup_key();
        if self.ctx.is_done() {
            debug!(resource_type = %def.resource_type, identifier = %key, "context done, skipping existence check");
            return (unverified_resource(def, OracleError::Canceled), None);
        }

        let state = match self.resources.check_exists(&def.resource_type, key, &self.ctx) {
            Ok(state) => state,
            Err(err) => {
                warn!(resource_type = %def.resource_type, identifier = %key, kind = %err.kind(), error = %err, "existence check failed");
                return (unverified_resource(def, err), None);
            }
        };
        if state.is_none() {
            return (aggregate_resource(def, None, &[], &self.evaluator), None);
        }

        let (rules, load_warning) = match self.rule_set(&def.resource_type) {
            Ok(rules) => (rules, None),
            Err(err) => {
                warn!(resource_type = %def.resource_type, error = %err, "rule set unavailable");
                let empty: RuleSet = Arc::from(Vec::<ValidationRule>::new());
                (empty, Some(rule_set_unavailable(def, err)))
            }
        };
        (
            aggregate_resource(def, state, &rules, &self.evaluator),
            load_warning,
        )
    }

    fn rule_set(&self, resource_type: &str) -> Result<RuleSet, ConfigError> {
        self.rule_sets.get_or_load(resource_type, || {
            self.config.load_rule_set(resource_type, &self.ctx)
        })
    }

    /// Errors and a done context both count as absent.
    fn stack_present(&self, name: &str) -> bool {
        if self.ctx.is_done() {
            debug!(stack = %name, "context done, skipping stack check");
            return false;
        }
        match self.stacks.stack_exists(name, &self.ctx) {
            Ok(present) => present,
            Err(err) => {
                warn!(stack = %name, kind = %err.kind(), error = %err, "stack check failed");
                false
            }
        }
    }
}

fn build_pool(workers: usize) -> Option<rayon::ThreadPool> {
    if workers <= 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("stepguard-worker-{i}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!(workers, error = %err, "failed to build worker pool, evaluating sequentially");
            None
        }
    }
}
