//! Assembles an [`ActivationContext`] from eagerly loaded state.

use qprofile_core::traits::DescendantSupplier;
use qprofile_core::types::{ActiveRule, OperationStamp, Profile, Rule, RuleSet};

use super::{ActivationContext, ContextStore};

#[derive(Debug)]
pub struct ActivationContextBuilder {
    base: RuleSet,
    rules: Vec<Rule>,
    profiles: Vec<Profile>,
    active_rules: Vec<ActiveRule>,
    stamp: OperationStamp,
}

impl ActivationContextBuilder {
    pub fn new(base: RuleSet) -> Self {
        Self {
            base,
            rules: Vec::new(),
            profiles: Vec::new(),
            active_rules: Vec::new(),
            stamp: OperationStamp::default(),
        }
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Profiles known up front: the profiles sharing the base rule set,
    /// plus the parent of a user profile.
    pub fn profiles(mut self, profiles: impl IntoIterator<Item = Profile>) -> Self {
        self.profiles.extend(profiles);
        self
    }

    pub fn active_rules(mut self, active_rules: impl IntoIterator<Item = ActiveRule>) -> Self {
        self.active_rules.extend(active_rules);
        self
    }

    pub fn stamp(mut self, stamp: OperationStamp) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn build(self, descendants: &dyn DescendantSupplier) -> ActivationContext<'_> {
        let mut store = ContextStore::new();
        let base_ruleset_id = self.base.id.clone();
        store.add_rule_set(self.base);

        let rule_ids = self.rules.iter().map(|r| r.id.clone()).collect();
        for rule in self.rules {
            store.add_rule(rule);
        }
        for profile in self.profiles {
            store.add_profile(profile);
        }
        for active_rule in self.active_rules {
            store.add_active_rule(active_rule);
        }

        ActivationContext::from_parts(store, base_ruleset_id, rule_ids, descendants, self.stamp)
    }
}
