//! Active rules: one rule enabled on one rule set.

use serde::{Deserialize, Serialize};

use super::collections::ParamMap;
use super::variant::text_enum;
use super::{RuleId, RuleSetId, Severity};

/// Identity of an active rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActiveRuleKey {
    pub ruleset_id: RuleSetId,
    pub rule_id: RuleId,
}

impl ActiveRuleKey {
    pub fn new(ruleset_id: impl Into<RuleSetId>, rule_id: impl Into<RuleId>) -> Self {
        Self {
            ruleset_id: ruleset_id.into(),
            rule_id: rule_id.into(),
        }
    }
}

/// How an active rule relates to the same rule on the parent profile.
/// An active rule with no tag was activated directly and has no parent link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Inheritance {
    Inherited,
    Overrides,
}

text_enum!(Inheritance, "inheritance", {
    Inherited => "INHERITED",
    Overrides => "OVERRIDES",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRule {
    pub key: ActiveRuleKey,
    pub severity: Severity,
    pub prioritized: bool,
    pub inheritance: Option<Inheritance>,
    pub params: ParamMap,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ActiveRule {
    pub fn new(key: ActiveRuleKey, severity: Severity) -> Self {
        Self {
            key,
            severity,
            prioritized: false,
            inheritance: None,
            params: ParamMap::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn with_inheritance(mut self, inheritance: Inheritance) -> Self {
        self.inheritance = Some(inheritance);
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_prioritized(mut self, prioritized: bool) -> Self {
        self.prioritized = prioritized;
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn does_override(&self) -> bool {
        self.inheritance == Some(Inheritance::Overrides)
    }

    pub fn is_inherited(&self) -> bool {
        self.inheritance == Some(Inheritance::Inherited)
    }
}
