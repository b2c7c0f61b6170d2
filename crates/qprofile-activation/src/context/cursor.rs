//! Immutable position of an operation: one rule on one rule set.

use qprofile_core::types::{ProfileId, ProfileIds, RuleId, RuleSetId};

/// Where the activator currently stands.
///
/// Cursors are only produced by [`super::ActivationContext::reset`] and
/// [`super::ActivationContext::select_child`], so a cursor always points at
/// a loaded rule and a loaded rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    rule_id: RuleId,
    ruleset_id: RuleSetId,
    profiles: ProfileIds,
    cascading: bool,
}

impl Cursor {
    pub(crate) fn new(rule_id: RuleId, ruleset_id: RuleSetId, profiles: ProfileIds, cascading: bool) -> Self {
        Self {
            rule_id,
            ruleset_id,
            profiles,
            cascading,
        }
    }

    pub fn rule_id(&self) -> &RuleId {
        &self.rule_id
    }

    pub fn ruleset_id(&self) -> &RuleSetId {
        &self.ruleset_id
    }

    /// Profiles sharing the cursor's rule set: zero or more for a built-in
    /// rule set, exactly one otherwise.
    pub fn profiles(&self) -> &[ProfileId] {
        &self.profiles
    }

    /// True once the cursor has moved below the operation's base rule set.
    pub fn is_cascading(&self) -> bool {
        self.cascading
    }
}
