//! Rule sets and the quality profiles that point at them.

use serde::{Deserialize, Serialize};

use super::{ProfileId, RuleSetId};

/// The shared, language-scoped container of active rules.
///
/// Several organization profiles may point at the same built-in rule set
/// until one of them diverges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: RuleSetId,
    pub name: String,
    pub language: String,
    pub is_built_in: bool,
    /// Epoch millis of the last change to the rule set's active rules.
    pub rules_updated_at: Option<i64>,
}

impl RuleSet {
    pub fn new(id: impl Into<RuleSetId>, name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
            is_built_in: false,
            rules_updated_at: None,
        }
    }

    pub fn built_in(mut self) -> Self {
        self.is_built_in = true;
        self
    }

    /// The rule set a profile currently points at, seen through the profile.
    pub fn of_profile(profile: &Profile) -> Self {
        Self {
            id: profile.ruleset_id.clone(),
            name: profile.name.clone(),
            language: profile.language.clone(),
            is_built_in: profile.is_built_in,
            rules_updated_at: None,
        }
    }
}

/// A named node in a per-organization inheritance tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub language: String,
    pub parent_id: Option<ProfileId>,
    pub ruleset_id: RuleSetId,
    pub is_built_in: bool,
    /// Epoch millis of the last change made by a user.
    pub user_updated_at: Option<i64>,
}

impl Profile {
    pub fn new(
        id: impl Into<ProfileId>,
        name: impl Into<String>,
        language: impl Into<String>,
        ruleset_id: impl Into<RuleSetId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
            parent_id: None,
            ruleset_id: ruleset_id.into(),
            is_built_in: false,
            user_updated_at: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<ProfileId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn built_in(mut self) -> Self {
        self.is_built_in = true;
        self
    }
}
