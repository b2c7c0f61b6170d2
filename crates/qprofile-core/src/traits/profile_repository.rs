use crate::errors::StorageError;
use crate::types::{ActiveRule, Profile, ProfileId, RuleId, RuleSet, RuleSetId};

/// Read access to profiles, rule sets and their active rules.
pub trait ProfileRepository {
    fn profile(&self, id: &ProfileId) -> Result<Option<Profile>, StorageError>;

    fn rule_set(&self, id: &RuleSetId) -> Result<Option<RuleSet>, StorageError>;

    /// Every profile currently pointing at the rule set.
    fn profiles_by_rule_set(&self, id: &RuleSetId) -> Result<Vec<Profile>, StorageError>;

    /// Active rules, params included, for every (rule set, rule) pair in
    /// the cross product of the two id lists.
    fn active_rules(
        &self,
        rule_ids: &[RuleId],
        ruleset_ids: &[RuleSetId],
    ) -> Result<Vec<ActiveRule>, StorageError>;

    /// Every active rule of one rule, across all rule sets.
    fn active_rules_of_rule(&self, rule_id: &RuleId) -> Result<Vec<ActiveRule>, StorageError>;

    /// Ids of the rules active on a rule set.
    fn active_rule_ids(&self, ruleset_id: &RuleSetId) -> Result<Vec<RuleId>, StorageError>;
}
