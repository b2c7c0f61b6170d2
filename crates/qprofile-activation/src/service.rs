//! Profile rules facade: the entry point used by profile management.
//!
//! Each method opens one activation context, runs the activator and
//! dispatches events. Transactions belong to the caller: run a method inside
//! the storage layer's transaction and roll back on any `Err`.

use serde::Serialize;

use qprofile_core::config::ActivationConfig;
use qprofile_core::errors::{ActivationError, StorageError};
use qprofile_core::events::{
    ActivationRejectedEvent, EventDispatcher, RuleDeletedEvent, RulesChangedEvent,
};
use qprofile_core::profile_operation_span;
use qprofile_core::traits::{ActivationBackend, Clock, ParamValidator};
use qprofile_core::types::{
    ActiveRuleChange, OperationStamp, Profile, ProfileId, RuleActivation, RuleId, RuleSet, RuleSetId,
    Severity,
};
use qprofile_core::QProfileErrorCode;

use crate::activator::RuleActivator;
use crate::context::{loader, ActivationContext};

/// Outcome of a bulk operation where every rule is an isolated request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkChangeResult {
    /// Rules that produced at least one change.
    pub succeeded: usize,
    /// Rules rejected with a request error.
    pub failed: usize,
    pub errors: Vec<String>,
    pub changes: Vec<ActiveRuleChange>,
}

impl BulkChangeResult {
    fn record(&mut self, changes: Vec<ActiveRuleChange>) {
        if !changes.is_empty() {
            self.succeeded += 1;
        }
        self.changes.extend(changes);
    }

    fn reject(&mut self, error: &ActivationError) {
        self.failed += 1;
        self.errors.push(error.to_string());
    }
}

pub struct QualityProfileRules<'a, B: ActivationBackend> {
    backend: &'a B,
    validator: &'a dyn ParamValidator,
    config: ActivationConfig,
    events: &'a EventDispatcher,
    clock: &'a dyn Clock,
}

impl<'a, B: ActivationBackend> QualityProfileRules<'a, B> {
    pub fn new(
        backend: &'a B,
        validator: &'a dyn ParamValidator,
        config: ActivationConfig,
        events: &'a EventDispatcher,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            backend,
            validator,
            config,
            events,
            clock,
        }
    }

    // ─── User profiles ───────────────────────────────────────────────

    /// Activate rules on a user profile and cascade to its descendants.
    pub fn activate(
        &self,
        profile_id: &ProfileId,
        requests: &[RuleActivation],
        user: Option<&str>,
    ) -> Result<Vec<ActiveRuleChange>, ActivationError> {
        let _span = profile_operation_span!("activate", profile_id).entered();
        let profile = self.editable_profile(profile_id)?;
        let rule_ids: Vec<RuleId> = requests.iter().map(|r| r.rule_id.clone()).collect();
        let mut ctx = loader::for_user_profile(self.backend, &profile, &rule_ids, self.stamp(user))?;

        let changes = self.activator().activate(&mut ctx, requests)?;
        self.rules_changed(&profile.language, vec![profile.id.clone()], &changes);
        tracing::info!(profile_id = %profile.id, requests = requests.len(), changes = changes.len(), "rules activated");
        Ok(changes)
    }

    /// Deactivate rules on a user profile and its descendants. Inherited
    /// rules are protected unless configuration allows disabling them.
    pub fn deactivate(
        &self,
        profile_id: &ProfileId,
        rule_ids: &[RuleId],
        user: Option<&str>,
    ) -> Result<Vec<ActiveRuleChange>, ActivationError> {
        let _span = profile_operation_span!("deactivate", profile_id).entered();
        let profile = self.editable_profile(profile_id)?;
        let mut ctx = loader::for_user_profile(self.backend, &profile, rule_ids, self.stamp(user))?;

        let activator = self.activator();
        let mut changes = Vec::new();
        for rule_id in rule_ids {
            changes.extend(activator.deactivate(&mut ctx, rule_id, false)?);
        }
        self.rules_changed(&profile.language, vec![profile.id.clone()], &changes);
        tracing::info!(profile_id = %profile.id, rules = rule_ids.len(), changes = changes.len(), "rules deactivated");
        Ok(changes)
    }

    /// Activate many rules with one severity. A rule rejected by validation
    /// is counted as failed; the others still apply.
    pub fn bulk_activate(
        &self,
        profile_id: &ProfileId,
        rule_ids: &[RuleId],
        severity: Option<Severity>,
        prioritized: Option<bool>,
        user: Option<&str>,
    ) -> Result<BulkChangeResult, ActivationError> {
        let _span = profile_operation_span!("bulk_activate", profile_id).entered();
        let profile = self.editable_profile(profile_id)?;
        let mut ctx = loader::for_user_profile(self.backend, &profile, rule_ids, self.stamp(user))?;

        let activator = self.activator();
        let mut result = BulkChangeResult::default();
        for rule_id in rule_ids {
            let request = RuleActivation {
                severity,
                prioritized,
                ..RuleActivation::create(rule_id.clone())
            };
            match activator.activate_one(&mut ctx, &request) {
                Ok(changes) => result.record(changes),
                Err(e) if e.is_request_error() => self.rejected(&ctx, rule_id, &e, &mut result),
                Err(e) => return Err(e),
            }
        }
        self.rules_changed(&profile.language, vec![profile.id.clone()], &result.changes);
        log_bulk("bulk_activate", &profile.id, &result);
        Ok(result)
    }

    pub fn bulk_deactivate(
        &self,
        profile_id: &ProfileId,
        rule_ids: &[RuleId],
        user: Option<&str>,
    ) -> Result<BulkChangeResult, ActivationError> {
        let _span = profile_operation_span!("bulk_deactivate", profile_id).entered();
        let profile = self.editable_profile(profile_id)?;
        let mut ctx = loader::for_user_profile(self.backend, &profile, rule_ids, self.stamp(user))?;

        let activator = self.activator();
        let mut result = BulkChangeResult::default();
        for rule_id in rule_ids {
            match activator.deactivate(&mut ctx, rule_id, false) {
                Ok(changes) => result.record(changes),
                Err(e) if e.is_request_error() => self.rejected(&ctx, rule_id, &e, &mut result),
                Err(e) => return Err(e),
            }
        }
        self.rules_changed(&profile.language, vec![profile.id.clone()], &result.changes);
        log_bulk("bulk_deactivate", &profile.id, &result);
        Ok(result)
    }

    // ─── Built-in rule sets ──────────────────────────────────────────

    /// Activate rules on a built-in rule set, cascading to every profile
    /// that inherits from a profile pointing at it.
    pub fn activate_built_in(
        &self,
        ruleset_id: &RuleSetId,
        requests: &[RuleActivation],
    ) -> Result<Vec<ActiveRuleChange>, ActivationError> {
        let _span = profile_operation_span!("activate_built_in", ruleset_id).entered();
        let rule_set = self.rule_set(ruleset_id)?;
        let rule_ids: Vec<RuleId> = requests.iter().map(|r| r.rule_id.clone()).collect();
        let mut ctx = loader::for_built_in_rule_set(self.backend, &rule_set, &rule_ids, self.stamp(None))?;

        let changes = self.activator().activate(&mut ctx, requests)?;
        self.rules_changed(&rule_set.language, sharing(&ctx, ruleset_id), &changes);
        tracing::info!(ruleset_id = %ruleset_id, requests = requests.len(), changes = changes.len(), "built-in rules activated");
        Ok(changes)
    }

    /// Deactivate rules on a built-in rule set. Always forced: built-in
    /// rule sets have no parent to protect.
    pub fn deactivate_built_in(
        &self,
        ruleset_id: &RuleSetId,
        rule_ids: &[RuleId],
    ) -> Result<Vec<ActiveRuleChange>, ActivationError> {
        let _span = profile_operation_span!("deactivate_built_in", ruleset_id).entered();
        let rule_set = self.rule_set(ruleset_id)?;
        let mut ctx = loader::for_built_in_rule_set(self.backend, &rule_set, rule_ids, self.stamp(None))?;

        let activator = self.activator();
        let mut changes = Vec::new();
        for rule_id in rule_ids {
            changes.extend(activator.deactivate(&mut ctx, rule_id, true)?);
        }
        self.rules_changed(&rule_set.language, sharing(&ctx, ruleset_id), &changes);
        tracing::info!(ruleset_id = %ruleset_id, rules = rule_ids.len(), changes = changes.len(), "built-in rules deactivated");
        Ok(changes)
    }

    // ─── Catalog ─────────────────────────────────────────────────────

    /// Remove every active row of a rule, on every rule set, without
    /// inheritance checks. Used when a rule leaves the catalog.
    pub fn delete_rule(&self, rule_id: &RuleId) -> Result<Vec<ActiveRuleChange>, ActivationError> {
        let _span = profile_operation_span!("delete_rule", rule_id).entered();
        let rule = self
            .backend
            .rules_by_ids(std::slice::from_ref(rule_id))?
            .into_iter()
            .next()
            .ok_or_else(|| ActivationError::RuleNotFound {
                rule_ids: vec![rule_id.to_string()],
            })?;
        let stamp = self.stamp(None);

        let mut changes = Vec::new();
        for active_rule in self.backend.active_rules_of_rule(rule_id)? {
            let change = ActiveRuleChange::deactivated(&active_rule, rule.key.clone());
            self.backend.persist(&change, &stamp)?;
            let profile_ids: Vec<ProfileId> = self
                .backend
                .profiles_by_rule_set(&active_rule.key.ruleset_id)?
                .into_iter()
                .map(|p| p.id)
                .collect();
            self.backend
                .touch_rule_set(&active_rule.key.ruleset_id, &profile_ids, &stamp)?;
            changes.push(change);
        }

        self.events.emit_rule_deleted(&RuleDeletedEvent {
            rule_id: rule_id.clone(),
            deactivated: changes.len(),
        });
        tracing::info!(rule_key = %rule.key, deactivated = changes.len(), "rule deleted from rule sets");
        Ok(changes)
    }

    // ─── Helpers ─────────────────────────────────────────────────────

    fn activator(&self) -> RuleActivator<'a> {
        RuleActivator::new(self.backend, self.validator, &self.config)
    }

    fn stamp(&self, user: Option<&str>) -> OperationStamp {
        OperationStamp {
            at: self.clock.now_millis(),
            user_id: user.map(str::to_string),
        }
    }

    fn editable_profile(&self, profile_id: &ProfileId) -> Result<Profile, ActivationError> {
        let profile = self
            .backend
            .profile(profile_id)?
            .ok_or_else(|| StorageError::NotFound {
                entity: "profile".to_string(),
                id: profile_id.to_string(),
            })?;
        if profile.is_built_in {
            return Err(ActivationError::BuiltInProfileReadOnly {
                profile_name: profile.name,
            });
        }
        Ok(profile)
    }

    fn rule_set(&self, ruleset_id: &RuleSetId) -> Result<RuleSet, ActivationError> {
        Ok(self
            .backend
            .rule_set(ruleset_id)?
            .ok_or_else(|| StorageError::NotFound {
                entity: "rule set".to_string(),
                id: ruleset_id.to_string(),
            })?)
    }

    fn rules_changed(&self, language: &str, profile_ids: Vec<ProfileId>, changes: &[ActiveRuleChange]) {
        if changes.is_empty() {
            return;
        }
        self.events.emit_rules_changed(&RulesChangedEvent {
            language: language.to_string(),
            profile_ids,
            changes: changes.to_vec(),
        });
    }

    fn rejected(
        &self,
        ctx: &ActivationContext<'_>,
        rule_id: &RuleId,
        error: &ActivationError,
        result: &mut BulkChangeResult,
    ) {
        self.events.emit_activation_rejected(&ActivationRejectedEvent {
            ruleset_id: ctx.base_ruleset_id().clone(),
            rule_id: rule_id.clone(),
            error_code: error.error_code(),
            message: error.to_string(),
        });
        result.reject(error);
    }
}

fn sharing(ctx: &ActivationContext<'_>, ruleset_id: &RuleSetId) -> Vec<ProfileId> {
    ctx.store().profiles_sharing(ruleset_id).to_vec()
}

fn log_bulk(operation: &'static str, profile_id: &ProfileId, result: &BulkChangeResult) {
    tracing::info!(
        operation,
        profile_id = %profile_id,
        succeeded = result.succeeded,
        failed = result.failed,
        changes = result.changes.len(),
        "bulk operation finished"
    );
}
