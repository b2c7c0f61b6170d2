//! Computed changes and the stamp of the operation that produced them.

use serde::{Deserialize, Serialize};

use super::collections::ParamMap;
use super::variant::text_enum;
use super::{ActiveRule, ActiveRuleKey, Inheritance, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Activated,
    Updated,
    Deactivated,
}

text_enum!(ChangeType, "change type", {
    Activated => "ACTIVATED",
    Updated => "UPDATED",
    Deactivated => "DEACTIVATED",
});

/// One computed change to one active rule.
///
/// For ACTIVATED and UPDATED the fields are the resulting state. For
/// DEACTIVATED they are the last state of the removed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRuleChange {
    pub change_type: ChangeType,
    pub key: ActiveRuleKey,
    pub rule_key: String,
    pub severity: Severity,
    pub prioritized: bool,
    pub inheritance: Option<Inheritance>,
    pub params: ParamMap,
}

impl ActiveRuleChange {
    pub fn deactivated(active_rule: &ActiveRule, rule_key: impl Into<String>) -> Self {
        Self {
            change_type: ChangeType::Deactivated,
            key: active_rule.key.clone(),
            rule_key: rule_key.into(),
            severity: active_rule.severity,
            prioritized: active_rule.prioritized,
            inheritance: active_rule.inheritance,
            params: active_rule.params.clone(),
        }
    }

    /// The active rule as it stands after this change, or `None` once
    /// deactivated. `created_at` is kept from `previous` when there is one.
    pub fn resulting_state(&self, previous: Option<&ActiveRule>, now: i64) -> Option<ActiveRule> {
        if self.change_type == ChangeType::Deactivated {
            return None;
        }
        Some(ActiveRule {
            key: self.key.clone(),
            severity: self.severity,
            prioritized: self.prioritized,
            inheritance: self.inheritance,
            params: self.params.clone(),
            created_at: previous.map_or(now, |p| p.created_at),
            updated_at: now,
        })
    }
}

/// When an operation happened and on whose behalf.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperationStamp {
    /// Epoch millis, shared by every change of the operation.
    pub at: i64,
    pub user_id: Option<String>,
}

impl OperationStamp {
    pub fn new(at: i64) -> Self {
        Self { at, user_id: None }
    }

    pub fn by_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}
