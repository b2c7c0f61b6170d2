//! Event payloads.

use crate::types::{ActiveRuleChange, ProfileId, RuleId, RuleSetId};

/// Changes committed by one operation, for downstream listeners.
#[derive(Debug, Clone)]
pub struct RulesChangedEvent {
    pub language: String,
    /// Profiles the operation was opened against.
    pub profile_ids: Vec<ProfileId>,
    pub changes: Vec<ActiveRuleChange>,
}

/// A single request rejected during a bulk operation.
#[derive(Debug, Clone)]
pub struct ActivationRejectedEvent {
    pub ruleset_id: RuleSetId,
    pub rule_id: RuleId,
    pub error_code: &'static str,
    pub message: String,
}

/// A rule removed from every rule set that had it active.
#[derive(Debug, Clone)]
pub struct RuleDeletedEvent {
    pub rule_id: RuleId,
    pub deactivated: usize,
}
