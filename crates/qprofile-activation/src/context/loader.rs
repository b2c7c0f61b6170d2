//! Eager loading of activation contexts from the repository.

use qprofile_core::errors::{ActivationError, StorageError};
use qprofile_core::traits::{DescendantSupplier, ProfileRepository, RuleCatalog};
use qprofile_core::types::{FxHashSet, OperationStamp, Profile, Rule, RuleId, RuleSet, RuleSetId};

use super::ActivationContext;

/// Context for a built-in rule set. Its profiles are the organization
/// copies pointing at it; those never have a parent.
pub fn for_built_in_rule_set<'a, B>(
    backend: &'a B,
    rule_set: &RuleSet,
    rule_ids: &[RuleId],
    stamp: OperationStamp,
) -> Result<ActivationContext<'a>, ActivationError>
where
    B: RuleCatalog + ProfileRepository + DescendantSupplier,
{
    if !rule_set.is_built_in {
        return Err(ActivationError::NotBuiltIn {
            ruleset_id: rule_set.id.to_string(),
        });
    }

    let rules = load_rules(backend, rule_ids)?;
    let profiles = backend.profiles_by_rule_set(&rule_set.id)?;

    let mut ruleset_ids = vec![rule_set.id.clone()];
    ruleset_ids.extend(profiles.iter().map(|p| p.ruleset_id.clone()));
    let active_rules = backend.active_rules(rule_ids, &dedup(ruleset_ids))?;

    tracing::debug!(
        ruleset_id = %rule_set.id,
        rules = rules.len(),
        profiles = profiles.len(),
        active_rules = active_rules.len(),
        "built-in activation context loaded"
    );

    Ok(ActivationContext::builder(rule_set.clone())
        .rules(rules)
        .profiles(profiles)
        .active_rules(active_rules)
        .stamp(stamp)
        .build(backend))
}

/// Context for a user profile: the profile itself and its parent.
pub fn for_user_profile<'a, B>(
    backend: &'a B,
    profile: &Profile,
    rule_ids: &[RuleId],
    stamp: OperationStamp,
) -> Result<ActivationContext<'a>, ActivationError>
where
    B: RuleCatalog + ProfileRepository + DescendantSupplier,
{
    if profile.is_built_in {
        return Err(ActivationError::UnexpectedBuiltIn {
            profile_id: profile.id.to_string(),
        });
    }

    let rules = load_rules(backend, rule_ids)?;

    let mut profiles = vec![profile.clone()];
    if let Some(parent_id) = &profile.parent_id {
        let parent = backend
            .profile(parent_id)?
            .ok_or_else(|| StorageError::NotFound {
                entity: "profile".to_string(),
                id: parent_id.to_string(),
            })?;
        profiles.push(parent);
    }

    let base = backend
        .rule_set(&profile.ruleset_id)?
        .unwrap_or_else(|| RuleSet::of_profile(profile));
    let ruleset_ids = dedup(profiles.iter().map(|p| p.ruleset_id.clone()).collect());
    let active_rules = backend.active_rules(rule_ids, &ruleset_ids)?;

    tracing::debug!(
        profile_id = %profile.id,
        rules = rules.len(),
        active_rules = active_rules.len(),
        has_parent = profile.parent_id.is_some(),
        "user activation context loaded"
    );

    Ok(ActivationContext::builder(base)
        .rules(rules)
        .profiles(profiles)
        .active_rules(active_rules)
        .stamp(stamp)
        .build(backend))
}

/// Every requested rule must exist in the catalog.
fn load_rules<C: RuleCatalog + ?Sized>(catalog: &C, rule_ids: &[RuleId]) -> Result<Vec<Rule>, ActivationError> {
    let rules = catalog.rules_by_ids(rule_ids)?;
    let found: FxHashSet<&RuleId> = rules.iter().map(|r| &r.id).collect();
    let missing: Vec<String> = rule_ids
        .iter()
        .filter(|id| !found.contains(id))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ActivationError::RuleNotFound { rule_ids: missing });
    }
    Ok(rules)
}

fn dedup(ids: Vec<RuleSetId>) -> Vec<RuleSetId> {
    let mut seen = FxHashSet::default();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
