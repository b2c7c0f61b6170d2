//! Append-only cache of everything one operation may touch.

use qprofile_core::types::{
    ActiveRule, ActiveRuleChange, ActiveRuleKey, FxHashMap, Profile, ProfileId, ProfileIds, Rule,
    RuleId, RuleSet, RuleSetId,
};

/// Rules, rule sets, profiles and active rules keyed by stable ids.
///
/// Loaded entries are never replaced: a second load of the same id is
/// ignored. Active rule state changes only through [`ContextStore::register`],
/// which records the result of a computed change, including deactivation.
#[derive(Debug, Default)]
pub struct ContextStore {
    rules: FxHashMap<RuleId, Rule>,
    rule_sets: FxHashMap<RuleSetId, RuleSet>,
    profiles: FxHashMap<ProfileId, Profile>,
    profiles_by_rule_set: FxHashMap<RuleSetId, ProfileIds>,
    children_by_parent: FxHashMap<ProfileId, Vec<ProfileId>>,
    /// `None` marks a row deactivated during this operation.
    active_rules: FxHashMap<ActiveRuleKey, Option<ActiveRule>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.entry(rule.id.clone()).or_insert(rule);
    }

    pub fn add_rule_set(&mut self, rule_set: RuleSet) {
        self.rule_sets.entry(rule_set.id.clone()).or_insert(rule_set);
    }

    /// Adds a profile and indexes it by rule set and parent. The profile's
    /// rule set is derived from the profile when not loaded explicitly.
    /// Returns false when the profile was already known.
    pub fn add_profile(&mut self, profile: Profile) -> bool {
        if self.profiles.contains_key(&profile.id) {
            return false;
        }
        self.add_rule_set(RuleSet::of_profile(&profile));
        self.profiles_by_rule_set
            .entry(profile.ruleset_id.clone())
            .or_default()
            .push(profile.id.clone());
        if let Some(parent_id) = &profile.parent_id {
            self.children_by_parent
                .entry(parent_id.clone())
                .or_default()
                .push(profile.id.clone());
        }
        self.profiles.insert(profile.id.clone(), profile);
        true
    }

    pub fn add_active_rule(&mut self, active_rule: ActiveRule) {
        self.active_rules
            .entry(active_rule.key.clone())
            .or_insert(Some(active_rule));
    }

    /// Records the outcome of a change so later reads see it.
    pub fn register(&mut self, change: &ActiveRuleChange, now: i64) {
        let previous = self.active_rule(&change.key);
        let state = change.resulting_state(previous, now);
        self.active_rules.insert(change.key.clone(), state);
    }

    pub fn rule(&self, id: &RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn rule_set(&self, id: &RuleSetId) -> Option<&RuleSet> {
        self.rule_sets.get(id)
    }

    pub fn profile(&self, id: &ProfileId) -> Option<&Profile> {
        self.profiles.get(id)
    }

    /// Profiles pointing at the rule set, in load order.
    pub fn profiles_sharing(&self, rule_set: &RuleSetId) -> &[ProfileId] {
        self.profiles_by_rule_set
            .get(rule_set)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Direct children of a profile, in load order.
    pub fn children_of(&self, parent: &ProfileId) -> &[ProfileId] {
        self.children_by_parent
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn active_rule(&self, key: &ActiveRuleKey) -> Option<&ActiveRule> {
        self.active_rules.get(key).and_then(Option::as_ref)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }
}
