//! Activation requests.

use serde::{Deserialize, Serialize};

use super::collections::ParamMap;
use super::{RuleId, Severity};

/// A request to activate (or reset) one rule.
///
/// Requested params may cover only a subset of the rule's declared params.
/// A requested param with a blank value is present but empty: it falls
/// through to the parent or default value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleActivation {
    pub rule_id: RuleId,
    pub severity: Option<Severity>,
    pub prioritized: Option<bool>,
    pub params: ParamMap,
    pub reset: bool,
}

impl RuleActivation {
    pub fn create(rule_id: impl Into<RuleId>) -> Self {
        Self {
            rule_id: rule_id.into(),
            ..Self::default()
        }
    }

    /// Discard local overrides and fall back to the parent or default values.
    pub fn reset(rule_id: impl Into<RuleId>) -> Self {
        Self {
            rule_id: rule_id.into(),
            reset: true,
            ..Self::default()
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_prioritized(mut self, prioritized: bool) -> Self {
        self.prioritized = Some(prioritized);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn has_requested_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// The requested value, or `None` when absent or blank.
    pub fn requested_param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}
