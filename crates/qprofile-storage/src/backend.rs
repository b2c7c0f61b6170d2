//! SQLite implementation of every activation collaborator.

use qprofile_core::errors::StorageError;
use qprofile_core::traits::{ChangeSink, DescendantSupplier, Descendants, ProfileRepository, RuleCatalog};
use qprofile_core::types::{
    ActiveRule, ActiveRuleChange, ChangeType, FxHashSet, OperationStamp, Profile, ProfileId, Rule,
    RuleId, RuleSet, RuleSetId,
};
use rusqlite::Connection;

use crate::queries::{active_rules, changes, profiles, rules};

/// Collaborator view of one connection, usually borrowed for the span of
/// one transaction (see [`crate::DatabaseManager::with_transaction`]).
#[derive(Clone, Copy)]
pub struct SqliteBackend<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteBackend<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }
}

impl std::fmt::Debug for SqliteBackend<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend").finish_non_exhaustive()
    }
}

impl RuleCatalog for SqliteBackend<'_> {
    fn rules_by_ids(&self, ids: &[RuleId]) -> Result<Vec<Rule>, StorageError> {
        rules::get_rules_by_ids(self.conn, ids)
    }
}

impl ProfileRepository for SqliteBackend<'_> {
    fn profile(&self, id: &ProfileId) -> Result<Option<Profile>, StorageError> {
        profiles::get_profile(self.conn, id)
    }

    fn rule_set(&self, id: &RuleSetId) -> Result<Option<RuleSet>, StorageError> {
        profiles::get_rule_set(self.conn, id)
    }

    fn profiles_by_rule_set(&self, id: &RuleSetId) -> Result<Vec<Profile>, StorageError> {
        profiles::get_profiles_by_rule_set(self.conn, id)
    }

    fn active_rules(
        &self,
        rule_ids: &[RuleId],
        ruleset_ids: &[RuleSetId],
    ) -> Result<Vec<ActiveRule>, StorageError> {
        active_rules::get_active_rules(self.conn, rule_ids, ruleset_ids)
    }

    fn active_rules_of_rule(&self, rule_id: &RuleId) -> Result<Vec<ActiveRule>, StorageError> {
        active_rules::get_active_rules_of_rule(self.conn, rule_id)
    }

    fn active_rule_ids(&self, ruleset_id: &RuleSetId) -> Result<Vec<RuleId>, StorageError> {
        active_rules::get_active_rule_ids(self.conn, ruleset_id)
    }
}

impl DescendantSupplier for SqliteBackend<'_> {
    fn supply(&self, parents: &[Profile], rule_ids: &[RuleId]) -> Result<Descendants, StorageError> {
        let mut seen: FxHashSet<ProfileId> = parents.iter().map(|p| p.id.clone()).collect();
        let mut descendants = Vec::new();
        for parent in parents {
            for profile in profiles::get_descendants(self.conn, &parent.id)? {
                if seen.insert(profile.id.clone()) {
                    descendants.push(profile);
                }
            }
        }

        let mut ruleset_seen = FxHashSet::default();
        let ruleset_ids: Vec<RuleSetId> = descendants
            .iter()
            .map(|p| p.ruleset_id.clone())
            .filter(|id| ruleset_seen.insert(id.clone()))
            .collect();
        let active_rules = active_rules::get_active_rules(self.conn, rule_ids, &ruleset_ids)?;

        tracing::debug!(
            parents = parents.len(),
            profiles = descendants.len(),
            active_rules = active_rules.len(),
            "descendants supplied"
        );
        Ok(Descendants {
            profiles: descendants,
            active_rules,
        })
    }
}

impl ChangeSink for SqliteBackend<'_> {
    fn persist(&self, change: &ActiveRuleChange, stamp: &OperationStamp) -> Result<(), StorageError> {
        match change.change_type {
            ChangeType::Deactivated => active_rules::delete_active_rule(self.conn, &change.key)?,
            ChangeType::Activated | ChangeType::Updated => {
                let state = change.resulting_state(None, stamp.at).ok_or_else(|| {
                    StorageError::Corrupt {
                        column: "change_type".to_string(),
                        value: change.change_type.to_string(),
                    }
                })?;
                if change.change_type == ChangeType::Activated {
                    active_rules::insert_active_rule(self.conn, &state)?;
                } else {
                    active_rules::update_active_rule(self.conn, &state)?;
                }
            }
        }
        changes::insert_change(self.conn, change, stamp)?;
        Ok(())
    }

    fn touch_rule_set(
        &self,
        ruleset_id: &RuleSetId,
        profile_ids: &[ProfileId],
        stamp: &OperationStamp,
    ) -> Result<(), StorageError> {
        profiles::touch_rule_set(self.conn, ruleset_id, stamp.at)?;
        if stamp.user_id.is_some() {
            profiles::touch_profiles(self.conn, profile_ids, stamp.at)?;
        }
        Ok(())
    }
}
