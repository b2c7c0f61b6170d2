//! Activation context: per-operation cache plus cursor movement.
//!
//! The context is built once per activation or deactivation call, for a
//! built-in rule set or for a user profile (see [`loader`]), and is never
//! shared across operations. The activator threads an immutable [`Cursor`]
//! through its recursion; the context answers reads at a cursor and records
//! computed changes.

pub mod builder;
pub mod cursor;
pub mod loader;
pub mod store;

use qprofile_core::errors::ActivationError;
use qprofile_core::traits::DescendantSupplier;
use qprofile_core::types::{
    ActiveRule, ActiveRuleChange, ActiveRuleKey, FxHashSet, OperationStamp, Profile, ProfileId,
    ProfileIds, Rule, RuleId, RuleSet, RuleSetId,
};

pub use builder::ActivationContextBuilder;
pub use cursor::Cursor;
pub use store::ContextStore;

pub struct ActivationContext<'a> {
    store: ContextStore,
    base_ruleset_id: RuleSetId,
    rule_ids: Vec<RuleId>,
    descendants: &'a dyn DescendantSupplier,
    descendants_loaded: bool,
    touched_rule_sets: FxHashSet<RuleSetId>,
    stamp: OperationStamp,
}

impl<'a> ActivationContext<'a> {
    /// Start building a context for operations on `base`.
    pub fn builder(base: RuleSet) -> ActivationContextBuilder {
        ActivationContextBuilder::new(base)
    }

    pub(crate) fn from_parts(
        store: ContextStore,
        base_ruleset_id: RuleSetId,
        rule_ids: Vec<RuleId>,
        descendants: &'a dyn DescendantSupplier,
        stamp: OperationStamp,
    ) -> Self {
        Self {
            store,
            base_ruleset_id,
            rule_ids,
            descendants,
            descendants_loaded: false,
            touched_rule_sets: FxHashSet::default(),
            stamp,
        }
    }

    // ---- Cursor movement ----

    /// Cursor on `rule_id` at the base rule set.
    pub fn reset(&self, rule_id: &RuleId) -> Result<Cursor, ActivationError> {
        if self.store.rule(rule_id).is_none() {
            return Err(ActivationError::RuleNotLoaded {
                rule_id: rule_id.to_string(),
            });
        }
        let profiles: ProfileIds = self
            .store
            .profiles_sharing(&self.base_ruleset_id)
            .iter()
            .cloned()
            .collect();
        Ok(Cursor::new(
            rule_id.clone(),
            self.base_ruleset_id.clone(),
            profiles,
            false,
        ))
    }

    /// Cursor on the same rule at a child profile's rule set.
    pub fn select_child(&self, cursor: &Cursor, child: &ProfileId) -> Result<Cursor, ActivationError> {
        let profile = self.store.profile(child).ok_or_else(|| ActivationError::ProfileNotLoaded {
            profile_id: child.to_string(),
        })?;
        if profile.is_built_in {
            return Err(ActivationError::ChildIsBuiltIn {
                profile_id: child.to_string(),
            });
        }
        let mut profiles = ProfileIds::new();
        profiles.push(profile.id.clone());
        Ok(Cursor::new(
            cursor.rule_id().clone(),
            profile.ruleset_id.clone(),
            profiles,
            true,
        ))
    }

    // ---- Reads at a cursor ----

    pub fn rule(&self, cursor: &Cursor) -> Result<&Rule, ActivationError> {
        self.store
            .rule(cursor.rule_id())
            .ok_or_else(|| ActivationError::RuleNotLoaded {
                rule_id: cursor.rule_id().to_string(),
            })
    }

    pub fn rule_set(&self, cursor: &Cursor) -> Result<&RuleSet, ActivationError> {
        self.store
            .rule_set(cursor.ruleset_id())
            .ok_or_else(|| ActivationError::RuleSetNotLoaded {
                ruleset_id: cursor.ruleset_id().to_string(),
            })
    }

    pub fn active_rule(&self, cursor: &Cursor) -> Option<&ActiveRule> {
        self.store.active_rule(&ActiveRuleKey::new(
            cursor.ruleset_id().clone(),
            cursor.rule_id().clone(),
        ))
    }

    /// The rule's active row on the parent of the cursor's first profile.
    /// Built-in rule sets and root profiles have none.
    pub fn parent_active_rule(&self, cursor: &Cursor) -> Option<&ActiveRule> {
        let profile = cursor.profiles().first().and_then(|id| self.store.profile(id))?;
        let parent = profile
            .parent_id
            .as_ref()
            .and_then(|id| self.store.profile(id))?;
        self.store.active_rule(&ActiveRuleKey::new(
            parent.ruleset_id.clone(),
            cursor.rule_id().clone(),
        ))
    }

    pub fn profiles(&self, cursor: &Cursor) -> Vec<&Profile> {
        cursor
            .profiles()
            .iter()
            .filter_map(|id| self.store.profile(id))
            .collect()
    }

    /// Display name used in rejection messages: the first profile's name,
    /// else the rule set's.
    pub fn display_name(&self, cursor: &Cursor) -> String {
        self.profiles(cursor)
            .first()
            .map(|p| p.name.clone())
            .or_else(|| self.store.rule_set(cursor.ruleset_id()).map(|rs| rs.name.clone()))
            .unwrap_or_else(|| cursor.ruleset_id().to_string())
    }

    /// Direct children of every profile sharing the cursor's rule set.
    /// The first call pulls all descendants of the base profiles.
    pub fn child_profiles(&mut self, cursor: &Cursor) -> Result<Vec<ProfileId>, ActivationError> {
        self.load_descendants()?;
        Ok(cursor
            .profiles()
            .iter()
            .flat_map(|id| self.store.children_of(id).iter().cloned())
            .collect())
    }

    fn load_descendants(&mut self) -> Result<(), ActivationError> {
        if self.descendants_loaded {
            return Ok(());
        }
        let parents: Vec<Profile> = self
            .store
            .profiles_sharing(&self.base_ruleset_id)
            .iter()
            .filter_map(|id| self.store.profile(id).cloned())
            .collect();
        if !parents.is_empty() {
            let descendants = self.descendants.supply(&parents, &self.rule_ids)?;
            let profile_count = descendants.profiles.len();
            let active_rule_count = descendants.active_rules.len();
            for profile in descendants.profiles {
                self.store.add_profile(profile);
            }
            for active_rule in descendants.active_rules {
                self.store.add_active_rule(active_rule);
            }
            tracing::debug!(
                base = %self.base_ruleset_id,
                profiles = profile_count,
                active_rules = active_rule_count,
                "descendant profiles loaded"
            );
        }
        self.descendants_loaded = true;
        Ok(())
    }

    // ---- Mutation ----

    /// Make a computed change visible to every later read of this operation.
    pub fn register(&mut self, change: &ActiveRuleChange) {
        self.store.register(change, self.stamp.at);
    }

    /// True the first time a rule set is touched during the operation.
    pub fn mark_touched(&mut self, ruleset_id: &RuleSetId) -> bool {
        self.touched_rule_sets.insert(ruleset_id.clone())
    }

    // ---- Operation metadata ----

    pub fn stamp(&self) -> &OperationStamp {
        &self.stamp
    }

    pub fn base_ruleset_id(&self) -> &RuleSetId {
        &self.base_ruleset_id
    }

    pub fn base_rule_set(&self) -> Option<&RuleSet> {
        self.store.rule_set(&self.base_ruleset_id)
    }

    pub fn rule_ids(&self) -> &[RuleId] {
        &self.rule_ids
    }

    pub fn descendants_loaded(&self) -> bool {
        self.descendants_loaded
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }
}

impl std::fmt::Debug for ActivationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationContext")
            .field("base_ruleset_id", &self.base_ruleset_id)
            .field("rule_ids", &self.rule_ids)
            .field("descendants_loaded", &self.descendants_loaded)
            .field("store", &self.store)
            .finish()
    }
}
