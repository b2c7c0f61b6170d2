use crate::errors::StorageError;
use crate::types::{ActiveRuleChange, OperationStamp, ProfileId, RuleSetId};

/// Durable destination of computed changes.
///
/// Called once per logical change, in cascade order, inside the caller's
/// transaction.
pub trait ChangeSink {
    /// Insert, update or delete the active rule and its params, and record
    /// a change log entry.
    fn persist(&self, change: &ActiveRuleChange, stamp: &OperationStamp) -> Result<(), StorageError>;

    /// Stamp the rule set's "rules updated at". When the stamp names a user,
    /// also stamp `user_updated_at` on the given profiles.
    fn touch_rule_set(
        &self,
        ruleset_id: &RuleSetId,
        profile_ids: &[ProfileId],
        stamp: &OperationStamp,
    ) -> Result<(), StorageError>;
}
