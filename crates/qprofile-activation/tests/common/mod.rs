//! Shared fixtures for activation integration tests.
#![allow(dead_code)]

pub mod memory;

use std::sync::{Arc, Mutex};

use qprofile_activation::{QualityProfileRules, TypeValidations};
use qprofile_core::config::ActivationConfig;
use qprofile_core::errors::ActivationError;
use qprofile_core::events::{
    ActivationRejectedEvent, EventDispatcher, ProfileEventHandler, RuleDeletedEvent, RulesChangedEvent,
};
use qprofile_core::traits::FixedClock;
use qprofile_core::types::{
    ActiveRule, ActiveRuleKey, ParamKind, ParamType, Profile, ProfileId, Rule, RuleParam, RuleSet,
    RuleSetId, Severity,
};
use qprofile_storage::queries::{active_rules, changes, profiles, rules};
use qprofile_storage::{DatabaseManager, SqliteBackend};

pub const NOW: i64 = 1_700_000_000_000;

/// `javascript:S1`, MAJOR, one integer param `max` defaulting to 10.
pub fn js_rule(id: &str) -> Rule {
    Rule::new(id, format!("javascript:{id}"), "js")
        .with_severity(Severity::Major)
        .with_param(RuleParam::new("max", ParamType::of(ParamKind::Integer)).with_default("10"))
}

/// A tenant profile named `name` on its own rule set `rs-<id>`.
pub fn tenant(id: &str, name: &str) -> Profile {
    Profile::new(id, name, "js", format!("rs-{id}"))
}

pub fn rs(id: &str) -> String {
    format!("rs-{id}")
}

#[derive(Default)]
pub struct Recorder {
    pub rules_changed: Mutex<Vec<RulesChangedEvent>>,
    pub rejected: Mutex<Vec<ActivationRejectedEvent>>,
    pub deleted: Mutex<Vec<RuleDeletedEvent>>,
}

impl ProfileEventHandler for Recorder {
    fn on_rules_changed(&self, event: &RulesChangedEvent) {
        self.rules_changed.lock().unwrap().push(event.clone());
    }

    fn on_activation_rejected(&self, event: &ActivationRejectedEvent) {
        self.rejected.lock().unwrap().push(event.clone());
    }

    fn on_rule_deleted(&self, event: &RuleDeletedEvent) {
        self.deleted.lock().unwrap().push(event.clone());
    }
}

/// An in-memory SQLite database plus the facade's collaborators.
pub struct Fixture {
    pub db: DatabaseManager,
    pub events: EventDispatcher,
    pub recorder: Arc<Recorder>,
    pub config: ActivationConfig,
    pub clock: FixedClock,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(ActivationConfig::default())
    }

    pub fn with_config(config: ActivationConfig) -> Self {
        let recorder = Arc::new(Recorder::default());
        let mut events = EventDispatcher::new();
        events.register(recorder.clone());
        Self {
            db: DatabaseManager::open_in_memory().unwrap(),
            events,
            recorder,
            config,
            clock: FixedClock(NOW),
        }
    }

    /// Run one facade call in one transaction.
    pub fn run<T, F>(&self, f: F) -> Result<T, ActivationError>
    where
        F: FnOnce(&QualityProfileRules<'_, SqliteBackend<'_>>) -> Result<T, ActivationError>,
    {
        self.db.with_transaction(|backend| {
            let service = QualityProfileRules::new(
                backend,
                &TypeValidations,
                self.config.clone(),
                &self.events,
                &self.clock,
            );
            f(&service)
        })
    }

    // ─── Seeding ─────────────────────────────────────────────────────

    pub fn rule(&self, rule: Rule) {
        self.db.with_connection(|c| rules::insert_rule(c, &rule)).unwrap();
    }

    pub fn rule_set(&self, rule_set: RuleSet) {
        self.db
            .with_connection(|c| profiles::insert_rule_set(c, &rule_set))
            .unwrap();
    }

    /// Inserts the profile, and its rule set unless already present.
    pub fn profile(&self, profile: Profile) {
        self.db
            .with_connection(|c| {
                if profiles::get_rule_set(c, &profile.ruleset_id)?.is_none() {
                    profiles::insert_rule_set(c, &RuleSet::of_profile(&profile))?;
                }
                profiles::insert_profile(c, &profile)
            })
            .unwrap();
    }

    pub fn active(&self, active_rule: ActiveRule) {
        self.db
            .with_connection(|c| active_rules::insert_active_rule(c, &active_rule))
            .unwrap();
    }

    // ─── Reads ───────────────────────────────────────────────────────

    pub fn active_rule(&self, ruleset_id: &str, rule_id: &str) -> Option<ActiveRule> {
        self.db
            .with_connection(|c| active_rules::get_active_rule(c, &ActiveRuleKey::new(ruleset_id, rule_id)))
            .unwrap()
    }

    pub fn stored_profile(&self, id: &str) -> Profile {
        self.db
            .with_connection(|c| profiles::get_profile(c, &ProfileId::from(id)))
            .unwrap()
            .unwrap()
    }

    pub fn stored_rule_set(&self, id: &str) -> RuleSet {
        self.db
            .with_connection(|c| profiles::get_rule_set(c, &RuleSetId::from(id)))
            .unwrap()
            .unwrap()
    }

    pub fn change_count(&self) -> i64 {
        self.db.with_connection(changes::count_changes).unwrap()
    }
}
