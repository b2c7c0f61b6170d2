//! In-memory backend: every collaborator over `RefCell`s, with call counters.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use qprofile_core::errors::StorageError;
use qprofile_core::traits::{ChangeSink, DescendantSupplier, Descendants, ProfileRepository, RuleCatalog};
use qprofile_core::types::{
    ActiveRule, ActiveRuleChange, ActiveRuleKey, OperationStamp, Profile, ProfileId, Rule, RuleId,
    RuleSet, RuleSetId,
};

#[derive(Default)]
pub struct MemoryBackend {
    pub rules: RefCell<Vec<Rule>>,
    pub rule_sets: RefCell<Vec<RuleSet>>,
    pub profiles: RefCell<Vec<Profile>>,
    pub active: RefCell<BTreeMap<ActiveRuleKey, ActiveRule>>,
    pub persisted: RefCell<Vec<ActiveRuleChange>>,
    pub touched: RefCell<Vec<(RuleSetId, Vec<ProfileId>)>>,
    pub supply_calls: Cell<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&self, rule: Rule) {
        self.rules.borrow_mut().push(rule);
    }

    pub fn add_rule_set(&self, rule_set: RuleSet) {
        self.rule_sets.borrow_mut().push(rule_set);
    }

    /// Adds the profile and, unless already known, a rule set of the same name.
    pub fn add_profile(&self, profile: Profile) {
        let known = self
            .rule_sets
            .borrow()
            .iter()
            .any(|rs| rs.id == profile.ruleset_id);
        if !known {
            self.add_rule_set(RuleSet::of_profile(&profile));
        }
        self.profiles.borrow_mut().push(profile);
    }

    pub fn add_active_rule(&self, active_rule: ActiveRule) {
        self.active
            .borrow_mut()
            .insert(active_rule.key.clone(), active_rule);
    }

    pub fn active_rule(&self, ruleset_id: &str, rule_id: &str) -> Option<ActiveRule> {
        self.active
            .borrow()
            .get(&ActiveRuleKey::new(ruleset_id, rule_id))
            .cloned()
    }

    fn children_of(&self, parent: &ProfileId) -> Vec<Profile> {
        let mut children: Vec<Profile> = self
            .profiles
            .borrow()
            .iter()
            .filter(|p| p.parent_id.as_ref() == Some(parent))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        children
    }
}

impl RuleCatalog for MemoryBackend {
    fn rules_by_ids(&self, ids: &[RuleId]) -> Result<Vec<Rule>, StorageError> {
        let rules = self.rules.borrow();
        Ok(ids
            .iter()
            .filter_map(|id| rules.iter().find(|r| &r.id == id).cloned())
            .collect())
    }
}

impl ProfileRepository for MemoryBackend {
    fn profile(&self, id: &ProfileId) -> Result<Option<Profile>, StorageError> {
        Ok(self.profiles.borrow().iter().find(|p| &p.id == id).cloned())
    }

    fn rule_set(&self, id: &RuleSetId) -> Result<Option<RuleSet>, StorageError> {
        Ok(self.rule_sets.borrow().iter().find(|rs| &rs.id == id).cloned())
    }

    fn profiles_by_rule_set(&self, id: &RuleSetId) -> Result<Vec<Profile>, StorageError> {
        Ok(self
            .profiles
            .borrow()
            .iter()
            .filter(|p| &p.ruleset_id == id)
            .cloned()
            .collect())
    }

    fn active_rules(
        &self,
        rule_ids: &[RuleId],
        ruleset_ids: &[RuleSetId],
    ) -> Result<Vec<ActiveRule>, StorageError> {
        Ok(self
            .active
            .borrow()
            .values()
            .filter(|a| rule_ids.contains(&a.key.rule_id) && ruleset_ids.contains(&a.key.ruleset_id))
            .cloned()
            .collect())
    }

    fn active_rules_of_rule(&self, rule_id: &RuleId) -> Result<Vec<ActiveRule>, StorageError> {
        Ok(self
            .active
            .borrow()
            .values()
            .filter(|a| &a.key.rule_id == rule_id)
            .cloned()
            .collect())
    }

    fn active_rule_ids(&self, ruleset_id: &RuleSetId) -> Result<Vec<RuleId>, StorageError> {
        Ok(self
            .active
            .borrow()
            .keys()
            .filter(|k| &k.ruleset_id == ruleset_id)
            .map(|k| k.rule_id.clone())
            .collect())
    }
}

impl DescendantSupplier for MemoryBackend {
    fn supply(&self, parents: &[Profile], rule_ids: &[RuleId]) -> Result<Descendants, StorageError> {
        self.supply_calls.set(self.supply_calls.get() + 1);
        let mut profiles = Vec::new();
        let mut queue: Vec<ProfileId> = parents.iter().map(|p| p.id.clone()).collect();
        while let Some(parent) = queue.pop() {
            for child in self.children_of(&parent) {
                queue.push(child.id.clone());
                profiles.push(child);
            }
        }
        let ruleset_ids: Vec<RuleSetId> = profiles.iter().map(|p| p.ruleset_id.clone()).collect();
        let active_rules = self.active_rules(rule_ids, &ruleset_ids)?;
        Ok(Descendants {
            profiles,
            active_rules,
        })
    }
}

impl ChangeSink for MemoryBackend {
    fn persist(&self, change: &ActiveRuleChange, stamp: &OperationStamp) -> Result<(), StorageError> {
        let mut active = self.active.borrow_mut();
        let previous = active.get(&change.key).cloned();
        match change.resulting_state(previous.as_ref(), stamp.at) {
            Some(state) => {
                active.insert(change.key.clone(), state);
            }
            None => {
                active.remove(&change.key);
            }
        }
        self.persisted.borrow_mut().push(change.clone());
        Ok(())
    }

    fn touch_rule_set(
        &self,
        ruleset_id: &RuleSetId,
        profile_ids: &[ProfileId],
        _stamp: &OperationStamp,
    ) -> Result<(), StorageError> {
        self.touched
            .borrow_mut()
            .push((ruleset_id.clone(), profile_ids.to_vec()));
        Ok(())
    }
}
