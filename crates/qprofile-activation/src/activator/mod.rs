//! Rule activator: cascading activation and deactivation over an
//! [`ActivationContext`].
//!
//! Both directions walk the inheritance tree depth-first from the base rule
//! set, parent before children. Every computed change is persisted through
//! the [`ChangeSink`] and registered in the context before the walk moves on,
//! so a child always reads its parent's fresh state.
//!
//! Activation only descends below a node whose row it just changed. It stops
//! at a child that overrides the rule, at a child it has just linked to its
//! parent, and at any node left unchanged. Deactivation always descends.

pub mod compare;
pub mod precedence;

use qprofile_core::config::ActivationConfig;
use qprofile_core::errors::ActivationError;
use qprofile_core::traits::{ChangeSink, ParamValidator};
use qprofile_core::types::{
    ActiveRule, ActiveRuleChange, ActiveRuleKey, ChangeType, Inheritance, Rule, RuleActivation, RuleId,
    RuleSet,
};
use qprofile_core::{activation_span, deactivation_span, QProfileErrorCode};

use crate::context::{ActivationContext, Cursor};
use precedence::{Inputs, ResolutionMode, Resolved};

/// What the activator decided at one cursor position.
enum Step {
    /// Nothing to do here or below.
    Stop,
    /// Persist, then visit the children.
    Changed(ActiveRuleChange),
    /// Persist, leave the children alone.
    ChangedStop(ActiveRuleChange),
}

pub struct RuleActivator<'s> {
    sink: &'s dyn ChangeSink,
    validator: &'s dyn ParamValidator,
    allow_disable_inherited_rules: bool,
}

impl<'s> RuleActivator<'s> {
    pub fn new(sink: &'s dyn ChangeSink, validator: &'s dyn ParamValidator, config: &ActivationConfig) -> Self {
        Self {
            sink,
            validator,
            allow_disable_inherited_rules: config.effective_allow_disable_inherited_rules(),
        }
    }

    /// Activate every request in order. Changes come back in request order,
    /// then cascade order. The first error aborts the call; changes already
    /// handed to the sink are left for the caller's transaction to roll back.
    pub fn activate(
        &self,
        ctx: &mut ActivationContext<'_>,
        requests: &[RuleActivation],
    ) -> Result<Vec<ActiveRuleChange>, ActivationError> {
        let mut changes = Vec::new();
        for request in requests {
            changes.extend(self.activate_one(ctx, request)?);
        }
        Ok(changes)
    }

    /// Activate a single request and its cascade.
    pub fn activate_one(
        &self,
        ctx: &mut ActivationContext<'_>,
        request: &RuleActivation,
    ) -> Result<Vec<ActiveRuleChange>, ActivationError> {
        let _span = activation_span!(request.rule_id, ctx.base_ruleset_id()).entered();
        let mut changes = Vec::new();
        let cursor = ctx.reset(&request.rule_id)?;
        let result = self.activate_at(ctx, &cursor, request, &mut changes);
        log_outcome("activation", &request.rule_id, &result, changes.len());
        result.map(|()| changes)
    }

    /// Deactivate one rule on the base rule set and every descendant.
    /// `force` bypasses the inherited-rule guard at the base.
    pub fn deactivate(
        &self,
        ctx: &mut ActivationContext<'_>,
        rule_id: &RuleId,
        force: bool,
    ) -> Result<Vec<ActiveRuleChange>, ActivationError> {
        let _span = deactivation_span!(rule_id, ctx.base_ruleset_id(), force).entered();
        let mut changes = Vec::new();
        let cursor = ctx.reset(rule_id)?;
        let result = self.deactivate_at(ctx, &cursor, force, &mut changes);
        log_outcome("deactivation", rule_id, &result, changes.len());
        result.map(|()| changes)
    }

    // ─── Activation ──────────────────────────────────────────────────

    fn activate_at(
        &self,
        ctx: &mut ActivationContext<'_>,
        cursor: &Cursor,
        request: &RuleActivation,
        out: &mut Vec<ActiveRuleChange>,
    ) -> Result<(), ActivationError> {
        match self.compute_activation(ctx, cursor, request)? {
            Step::Stop => return Ok(()),
            Step::ChangedStop(change) => return self.persist(ctx, cursor, change, out),
            Step::Changed(change) => self.persist(ctx, cursor, change, out)?,
        }
        for child in ctx.child_profiles(cursor)? {
            let child_cursor = ctx.select_child(cursor, &child)?;
            self.activate_at(ctx, &child_cursor, request, out)?;
        }
        Ok(())
    }

    fn compute_activation(
        &self,
        ctx: &ActivationContext<'_>,
        cursor: &Cursor,
        request: &RuleActivation,
    ) -> Result<Step, ActivationError> {
        let rule = ctx.rule(cursor)?;
        let rule_set = ctx.rule_set(cursor)?;
        validate_rule(rule, rule_set, || ctx.display_name(cursor))?;

        let active = ctx.active_rule(cursor);
        let parent = ctx.parent_active_rule(cursor);
        let key = || ActiveRuleKey::new(cursor.ruleset_id().clone(), rule.id.clone());

        let Some(existing) = active else {
            if request.reset {
                return Ok(Step::Stop);
            }
            let resolved = self.resolve(ResolutionMode::select(request, rule_set), request, rule, None, parent)?;
            let inheritance = compare::tag(rule, &resolved, parent);
            return Ok(Step::Changed(change(ChangeType::Activated, key(), rule, resolved, inheritance)));
        };

        if cursor.is_cascading() && existing.does_override() {
            return Ok(Step::Stop);
        }

        if cursor.is_cascading() && existing.inheritance.is_none() {
            // Activated directly before the parent had it: keep the values,
            // link it to the parent. Its subtree follows its own values.
            let resolved = Resolved::of_active_rule(existing);
            let inheritance = compare::tag(rule, &resolved, parent);
            if inheritance.is_none() {
                return Ok(Step::Stop);
            }
            return Ok(Step::ChangedStop(change(ChangeType::Updated, key(), rule, resolved, inheritance)));
        }

        let mode = ResolutionMode::select(request, rule_set);
        let resolved = self.resolve(mode, request, rule, Some(existing), parent)?;
        let inheritance = compare::tag(rule, &resolved, parent);

        if compare::is_same(&resolved, inheritance, existing) {
            return Ok(Step::Stop);
        }
        Ok(Step::Changed(change(ChangeType::Updated, key(), rule, resolved, inheritance)))
    }

    fn resolve(
        &self,
        mode: ResolutionMode,
        request: &RuleActivation,
        rule: &Rule,
        active: Option<&ActiveRule>,
        parent: Option<&ActiveRule>,
    ) -> Result<Resolved, ActivationError> {
        let resolved = precedence::resolve(
            mode,
            &Inputs {
                request,
                rule,
                active,
                parent,
            },
        );
        for param in &rule.params {
            if let Some(value) = resolved.params.get(&param.name) {
                self.validator
                    .validate(param, value)
                    .map_err(|e| ActivationError::InvalidParam {
                        rule_key: rule.key.clone(),
                        param: param.name.clone(),
                        value: value.clone(),
                        message: e.message,
                    })?;
            }
        }
        Ok(resolved)
    }

    // ─── Deactivation ────────────────────────────────────────────────

    fn deactivate_at(
        &self,
        ctx: &mut ActivationContext<'_>,
        cursor: &Cursor,
        force: bool,
        out: &mut Vec<ActiveRuleChange>,
    ) -> Result<(), ActivationError> {
        if let Some(change) = self.compute_deactivation(ctx, cursor, force)? {
            self.persist(ctx, cursor, change, out)?;
        }
        // A child may have the rule active even when this node does not.
        for child in ctx.child_profiles(cursor)? {
            let child_cursor = ctx.select_child(cursor, &child)?;
            self.deactivate_at(ctx, &child_cursor, force, out)?;
        }
        Ok(())
    }

    fn compute_deactivation(
        &self,
        ctx: &ActivationContext<'_>,
        cursor: &Cursor,
        force: bool,
    ) -> Result<Option<ActiveRuleChange>, ActivationError> {
        let Some(existing) = ctx.active_rule(cursor) else {
            return Ok(None);
        };
        let rule = ctx.rule(cursor)?;
        let permitted = force
            || cursor.is_cascading()
            || existing.inheritance.is_none()
            || self.allow_disable_inherited_rules;
        if !permitted {
            return Err(ActivationError::InheritedRuleProtected {
                rule_key: rule.key.clone(),
                profile_name: ctx.display_name(cursor),
            });
        }
        Ok(Some(ActiveRuleChange::deactivated(existing, rule.key.clone())))
    }

    // ─── Persistence ─────────────────────────────────────────────────

    fn persist(
        &self,
        ctx: &mut ActivationContext<'_>,
        cursor: &Cursor,
        change: ActiveRuleChange,
        out: &mut Vec<ActiveRuleChange>,
    ) -> Result<(), ActivationError> {
        self.sink.persist(&change, ctx.stamp())?;
        ctx.register(&change);
        if ctx.mark_touched(cursor.ruleset_id()) {
            self.sink
                .touch_rule_set(cursor.ruleset_id(), cursor.profiles(), ctx.stamp())?;
        }
        tracing::debug!(
            change_type = %change.change_type,
            rule_key = %change.rule_key,
            ruleset_id = %cursor.ruleset_id(),
            severity = %change.severity,
            inheritance = ?change.inheritance,
            cascading = cursor.is_cascading(),
            "active rule change"
        );
        out.push(change);
        Ok(())
    }
}

impl std::fmt::Debug for RuleActivator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleActivator")
            .field("allow_disable_inherited_rules", &self.allow_disable_inherited_rules)
            .finish()
    }
}

/// Removed rules, templates and foreign-language rules are never activated.
fn validate_rule(
    rule: &Rule,
    rule_set: &RuleSet,
    display_name: impl FnOnce() -> String,
) -> Result<(), ActivationError> {
    if rule.is_removed() {
        return Err(ActivationError::RuleRemoved {
            rule_key: rule.key.clone(),
        });
    }
    if rule.is_template {
        return Err(ActivationError::RuleTemplate {
            rule_key: rule.key.clone(),
        });
    }
    if rule.language != rule_set.language {
        return Err(ActivationError::LanguageMismatch {
            rule_language: rule.language.clone(),
            rule_key: rule.key.clone(),
            profile_language: rule_set.language.clone(),
            profile_name: display_name(),
        });
    }
    Ok(())
}

fn change(
    change_type: ChangeType,
    key: ActiveRuleKey,
    rule: &Rule,
    resolved: Resolved,
    inheritance: Option<Inheritance>,
) -> ActiveRuleChange {
    ActiveRuleChange {
        change_type,
        key,
        rule_key: rule.key.clone(),
        severity: resolved.severity,
        prioritized: resolved.prioritized,
        inheritance,
        params: resolved.params,
    }
}

fn log_outcome(
    operation: &'static str,
    rule_id: &RuleId,
    result: &Result<(), ActivationError>,
    changes: usize,
) {
    match result {
        Ok(()) => tracing::debug!(operation, rule_id = %rule_id, changes, "request applied"),
        Err(e) if e.is_request_error() => tracing::warn!(
            operation,
            rule_id = %rule_id,
            error_code = e.error_code(),
            error = %e,
            "request rejected"
        ),
        Err(e) => tracing::error!(operation, rule_id = %rule_id, error = %e, "request failed"),
    }
}
