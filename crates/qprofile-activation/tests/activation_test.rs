//! End-to-end activation and deactivation through the profile rules facade,
//! persisted in SQLite.

mod common;

use common::{js_rule, rs, tenant, Fixture, NOW};
use qprofile_activation::context::loader;
use qprofile_activation::{RuleActivator, TypeValidations};
use qprofile_core::config::ActivationConfig;
use qprofile_core::errors::ActivationError;
use qprofile_core::traits::ProfileRepository;
use qprofile_core::types::{
    ActiveRule, ActiveRuleChange, ActiveRuleKey, ChangeType, Inheritance, OperationStamp, ParamKind,
    ParamType, Profile, ProfileId, Rule, RuleActivation, RuleId, RuleParam, RuleSet, RuleSetId,
    RuleStatus, Severity,
};
use qprofile_storage::queries::{changes, rules};

fn single() -> Fixture {
    let fx = Fixture::new();
    fx.rule(js_rule("r1"));
    fx.profile(tenant("p", "Parent"));
    fx
}

fn parent_and_child_with(config: ActivationConfig) -> Fixture {
    let fx = Fixture::with_config(config);
    fx.rule(js_rule("r1"));
    fx.profile(tenant("p", "Parent"));
    fx.profile(tenant("c", "Child").with_parent("p"));
    fx
}

fn parent_and_child() -> Fixture {
    parent_and_child_with(ActivationConfig::default())
}

fn protecting_inherited_rules() -> ActivationConfig {
    ActivationConfig {
        allow_disable_inherited_rules: Some(false),
    }
}

fn activate(fx: &Fixture, profile: &str, request: RuleActivation) -> Result<Vec<ActiveRuleChange>, ActivationError> {
    fx.run(|s| s.activate(&ProfileId::from(profile), &[request], None))
}

fn deactivate(fx: &Fixture, profile: &str, rule: &str) -> Result<Vec<ActiveRuleChange>, ActivationError> {
    fx.run(|s| s.deactivate(&ProfileId::from(profile), &[RuleId::from(rule)], None))
}

fn rule_sets_of(changes: &[ActiveRuleChange]) -> Vec<&str> {
    changes.iter().map(|c| c.key.ruleset_id.as_str()).collect()
}

fn with_built_in(fx: &Fixture) {
    fx.rule_set(RuleSet::new("js-builtin", "Sonar way", "js").built_in());
    fx.profile(Profile::new("sonar-way", "Sonar way", "js", "js-builtin").built_in());
}

// ═══════════════════════════════════════════════════════════════════════
// Activation on a single profile
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn activating_twice_is_idempotent() {
    let fx = single();
    let request = RuleActivation::create("r1").with_severity(Severity::Critical);

    let first = activate(&fx, "p", request.clone()).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].change_type, ChangeType::Activated);
    assert_eq!(first[0].severity, Severity::Critical);
    assert!(!first[0].prioritized);
    assert_eq!(first[0].inheritance, None);
    assert_eq!(first[0].params.get("max").map(String::as_str), Some("10"));

    let second = activate(&fx, "p", request).unwrap();
    assert!(second.is_empty());
}

#[test]
fn reset_without_parent_falls_back_to_rule_default() {
    let fx = single();
    activate(&fx, "p", RuleActivation::create("r1").with_severity(Severity::Blocker)).unwrap();

    let changes = activate(&fx, "p", RuleActivation::reset("r1")).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, ChangeType::Updated);
    assert_eq!(changes[0].severity, Severity::Major);
    assert_eq!(fx.active_rule(&rs("p"), "r1").unwrap().severity, Severity::Major);
}

#[test]
fn reset_of_inactive_rule_does_nothing() {
    let fx = single();
    let changes = activate(&fx, "p", RuleActivation::reset("r1")).unwrap();
    assert!(changes.is_empty());
    assert!(fx.active_rule(&rs("p"), "r1").is_none());
}

#[test]
fn existing_row_without_parent_keeps_its_values() {
    let fx = single();
    fx.active(
        ActiveRule::new(ActiveRuleKey::new(rs("p"), "r1"), Severity::Blocker).with_param("max", "3"),
    );

    let changes = activate(&fx, "p", RuleActivation::create("r1")).unwrap();
    assert!(changes.is_empty());
    let row = fx.active_rule(&rs("p"), "r1").unwrap();
    assert_eq!(row.severity, Severity::Blocker);
    assert_eq!(row.param("max"), Some("3"));
}

#[test]
fn blank_param_falls_back_to_default() {
    let fx = single();
    activate(&fx, "p", RuleActivation::create("r1").with_param("max", "3")).unwrap();
    assert_eq!(fx.active_rule(&rs("p"), "r1").unwrap().param("max"), Some("3"));

    let changes = activate(&fx, "p", RuleActivation::create("r1").with_param("max", "")).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].params.get("max").map(String::as_str), Some("10"));
}

#[test]
fn custom_rule_ignores_requested_params() {
    let fx = single();
    let max = RuleParam::new("max", ParamType::of(ParamKind::Integer)).with_default("5");
    fx.rule(Rule::new("tpl", "javascript:tpl", "js").as_template().with_param(max.clone()));
    fx.rule(Rule::new("cus", "javascript:cus", "js").from_template("tpl").with_param(max));

    let changes = activate(&fx, "p", RuleActivation::create("cus").with_param("max", "7")).unwrap();
    assert_eq!(changes[0].params.get("max").map(String::as_str), Some("5"));
}

// ═══════════════════════════════════════════════════════════════════════
// Rejected requests
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn template_rule_is_rejected() {
    let fx = single();
    fx.rule(Rule::new("tpl", "javascript:tpl", "js").as_template());
    let err = activate(&fx, "p", RuleActivation::create("tpl")).unwrap_err();
    assert!(matches!(err, ActivationError::RuleTemplate { .. }));
    assert_eq!(
        err.to_string(),
        "Rule template can't be activated on a Quality profile: javascript:tpl"
    );
}

#[test]
fn removed_rule_is_rejected() {
    let fx = single();
    fx.db
        .with_connection(|c| rules::update_rule_status(c, &RuleId::from("r1"), RuleStatus::Removed))
        .unwrap();
    let err = activate(&fx, "p", RuleActivation::create("r1")).unwrap_err();
    assert_eq!(err.to_string(), "Rule was removed: javascript:r1");
}

#[test]
fn foreign_language_rule_is_rejected() {
    let fx = single();
    fx.rule(Rule::new("j1", "java:S1", "java"));
    let err = activate(&fx, "p", RuleActivation::create("j1")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "java rule java:S1 cannot be activated on js profile Parent"
    );
}

#[test]
fn invalid_param_rolls_back() {
    let fx = single();
    let err = activate(&fx, "p", RuleActivation::create("r1").with_param("max", "abc")).unwrap_err();
    assert!(matches!(err, ActivationError::InvalidParam { ref param, .. } if param == "max"));
    assert!(fx.active_rule(&rs("p"), "r1").is_none());
    assert_eq!(fx.change_count(), 0);
}

#[test]
fn unknown_rule_is_fatal() {
    let fx = single();
    let err = activate(&fx, "p", RuleActivation::create("missing")).unwrap_err();
    assert!(matches!(err, ActivationError::RuleNotFound { ref rule_ids } if rule_ids == &["missing".to_string()]));
    assert!(!err.is_request_error());
}

#[test]
fn built_in_profile_is_read_only() {
    let fx = single();
    with_built_in(&fx);
    let err = activate(&fx, "sonar-way", RuleActivation::create("r1")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The built-in profile Sonar way is read-only and can't be updated"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Inheritance
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn child_inherits_parent_activation() {
    let fx = parent_and_child();
    let changes = activate(
        &fx,
        "p",
        RuleActivation::create("r1")
            .with_severity(Severity::Critical)
            .with_prioritized(true),
    )
    .unwrap();

    assert_eq!(rule_sets_of(&changes), ["rs-p", "rs-c"]);
    assert_eq!(changes[0].inheritance, None);
    assert_eq!(changes[1].change_type, ChangeType::Activated);
    assert_eq!(changes[1].inheritance, Some(Inheritance::Inherited));
    assert_eq!(changes[1].severity, Severity::Critical);
    assert!(changes[1].prioritized);
}

#[test]
fn reset_falls_back_to_parent_severity() {
    let fx = parent_and_child();
    activate(&fx, "p", RuleActivation::create("r1").with_severity(Severity::Critical)).unwrap();

    let overridden = activate(&fx, "c", RuleActivation::create("r1").with_severity(Severity::Blocker)).unwrap();
    assert_eq!(overridden.len(), 1);
    assert_eq!(overridden[0].inheritance, Some(Inheritance::Overrides));

    let reset = activate(&fx, "c", RuleActivation::reset("r1")).unwrap();
    assert_eq!(reset.len(), 1);
    assert_eq!(reset[0].severity, Severity::Critical);
    assert_eq!(reset[0].inheritance, Some(Inheritance::Inherited));
}

#[test]
fn override_is_sticky_under_propagation() {
    let fx = parent_and_child();
    activate(&fx, "p", RuleActivation::create("r1")).unwrap();
    activate(&fx, "c", RuleActivation::create("r1").with_severity(Severity::Blocker)).unwrap();

    let changes = activate(&fx, "p", RuleActivation::create("r1").with_severity(Severity::Minor)).unwrap();
    assert_eq!(rule_sets_of(&changes), ["rs-p"]);

    let child = fx.active_rule(&rs("c"), "r1").unwrap();
    assert_eq!(child.severity, Severity::Blocker);
    assert_eq!(child.inheritance, Some(Inheritance::Overrides));
}

#[test]
fn directly_activated_child_is_linked_when_parent_catches_up() {
    let fx = parent_and_child();
    let direct = activate(&fx, "c", RuleActivation::create("r1").with_severity(Severity::Blocker)).unwrap();
    assert_eq!(direct[0].inheritance, None);

    let changes = activate(&fx, "p", RuleActivation::create("r1").with_severity(Severity::Minor)).unwrap();
    assert_eq!(rule_sets_of(&changes), ["rs-p", "rs-c"]);
    assert_eq!(changes[1].change_type, ChangeType::Updated);
    assert_eq!(changes[1].severity, Severity::Blocker);
    assert_eq!(changes[1].inheritance, Some(Inheritance::Overrides));

    let again = activate(&fx, "p", RuleActivation::create("r1").with_severity(Severity::Critical)).unwrap();
    assert_eq!(rule_sets_of(&again), ["rs-p"]);
}

#[test]
fn cascade_stops_below_a_linked_child() {
    let fx = parent_and_child();
    fx.profile(tenant("g", "Grandchild").with_parent("c"));
    fx.active(ActiveRule::new(ActiveRuleKey::new(rs("c"), "r1"), Severity::Blocker).with_param("max", "10"));

    let changes = activate(&fx, "p", RuleActivation::create("r1").with_severity(Severity::Minor)).unwrap();
    assert_eq!(rule_sets_of(&changes), ["rs-p", "rs-c"]);
    assert_eq!(changes[1].severity, Severity::Blocker);
    assert_eq!(changes[1].inheritance, Some(Inheritance::Overrides));
    assert!(fx.active_rule(&rs("g"), "r1").is_none());
}

#[test]
fn grandchild_keeps_following_a_linked_child() {
    let fx = parent_and_child();
    fx.profile(tenant("g", "Grandchild").with_parent("c"));
    fx.active(ActiveRule::new(ActiveRuleKey::new(rs("c"), "r1"), Severity::Blocker).with_param("max", "10"));
    fx.active(
        ActiveRule::new(ActiveRuleKey::new(rs("g"), "r1"), Severity::Blocker)
            .with_inheritance(Inheritance::Inherited)
            .with_param("max", "10"),
    );

    let changes = activate(&fx, "p", RuleActivation::create("r1").with_severity(Severity::Minor)).unwrap();
    assert_eq!(rule_sets_of(&changes), ["rs-p", "rs-c"]);

    let grandchild = fx.active_rule(&rs("g"), "r1").unwrap();
    assert_eq!(grandchild.severity, Severity::Blocker);
    assert_eq!(grandchild.inheritance, Some(Inheritance::Inherited));
}

#[test]
fn cascade_is_depth_first_parent_before_children() {
    let fx = Fixture::new();
    fx.rule(js_rule("r1"));
    fx.profile(tenant("p", "Parent"));
    fx.profile(tenant("c1", "Alpha").with_parent("p"));
    fx.profile(tenant("c2", "Beta").with_parent("p"));
    fx.profile(tenant("g", "Gamma").with_parent("c1"));

    let changes = activate(&fx, "p", RuleActivation::create("r1")).unwrap();
    assert_eq!(rule_sets_of(&changes), ["rs-p", "rs-c1", "rs-g", "rs-c2"]);
    assert!(changes[1..]
        .iter()
        .all(|c| c.inheritance == Some(Inheritance::Inherited)));
}

// ═══════════════════════════════════════════════════════════════════════
// Deactivation
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn inherited_rule_is_protected_when_configured() {
    let fx = parent_and_child_with(protecting_inherited_rules());
    activate(&fx, "p", RuleActivation::create("r1")).unwrap();

    let err = deactivate(&fx, "c", "r1").unwrap_err();
    assert!(matches!(
        err,
        ActivationError::InheritedRuleProtected { ref rule_key, ref profile_name }
            if rule_key == "javascript:r1" && profile_name == "Child"
    ));
    assert!(fx.active_rule(&rs("c"), "r1").is_some());
}

#[test]
fn forced_deactivation_bypasses_protection() {
    let config = protecting_inherited_rules();
    let fx = parent_and_child_with(config.clone());
    activate(&fx, "p", RuleActivation::create("r1")).unwrap();

    let rule_id = RuleId::from("r1");
    let changes = fx
        .db
        .with_transaction(|backend| {
            let profile = backend.profile(&ProfileId::from("c"))?.unwrap();
            let mut ctx = loader::for_user_profile(
                backend,
                &profile,
                std::slice::from_ref(&rule_id),
                OperationStamp::new(NOW),
            )?;
            RuleActivator::new(backend, &TypeValidations, &config).deactivate(&mut ctx, &rule_id, true)
        })
        .unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, ChangeType::Deactivated);
    assert!(fx.active_rule(&rs("c"), "r1").is_none());
    assert!(fx.active_rule(&rs("p"), "r1").is_some());
}

#[test]
fn inherited_rule_deactivates_by_default() {
    let fx = parent_and_child();
    activate(&fx, "p", RuleActivation::create("r1")).unwrap();
    let changes = deactivate(&fx, "c", "r1").unwrap();
    assert_eq!(rule_sets_of(&changes), ["rs-c"]);
    assert_eq!(changes[0].inheritance, Some(Inheritance::Inherited));
}

#[test]
fn deactivation_cascades_through_overrides() {
    let fx = parent_and_child_with(protecting_inherited_rules());
    activate(&fx, "p", RuleActivation::create("r1")).unwrap();
    activate(&fx, "c", RuleActivation::create("r1").with_severity(Severity::Blocker)).unwrap();

    let changes = deactivate(&fx, "p", "r1").unwrap();
    assert_eq!(rule_sets_of(&changes), ["rs-p", "rs-c"]);
    assert!(changes.iter().all(|c| c.change_type == ChangeType::Deactivated));
    assert_eq!(changes[1].severity, Severity::Blocker);
    assert!(fx.active_rule(&rs("c"), "r1").is_none());
}

#[test]
fn deactivation_reaches_children_below_inactive_parent() {
    let fx = parent_and_child();
    activate(&fx, "c", RuleActivation::create("r1")).unwrap();

    let changes = deactivate(&fx, "p", "r1").unwrap();
    assert_eq!(rule_sets_of(&changes), ["rs-c"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in rule sets
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn built_in_activation_ignores_leftover_state() {
    let fx = single();
    with_built_in(&fx);
    fx.active(
        ActiveRule::new(ActiveRuleKey::new("js-builtin", "r1"), Severity::Blocker)
            .with_prioritized(true)
            .with_param("max", "99"),
    );

    let changes = fx
        .run(|s| s.activate_built_in(&RuleSetId::from("js-builtin"), &[RuleActivation::create("r1")]))
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change_type, ChangeType::Updated);
    assert_eq!(changes[0].severity, Severity::Major);
    assert!(!changes[0].prioritized);
    assert_eq!(changes[0].params.get("max").map(String::as_str), Some("10"));
}

#[test]
fn built_in_update_cascades_to_inheriting_profiles_only() {
    let fx = Fixture::new();
    fx.rule(js_rule("R1"));
    with_built_in(&fx);
    let built_in = RuleSetId::from("js-builtin");

    let first = fx
        .run(|s| s.activate_built_in(&built_in, &[RuleActivation::create("R1")]))
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].change_type, ChangeType::Activated);
    assert_eq!(first[0].severity, Severity::Major);
    assert!(!first[0].prioritized);

    fx.profile(tenant("a", "A").with_parent("sonar-way"));
    fx.active(
        ActiveRule::new(ActiveRuleKey::new(rs("a"), "R1"), Severity::Major)
            .with_inheritance(Inheritance::Inherited)
            .with_param("max", "10"),
    );
    fx.profile(tenant("b", "B").with_parent("sonar-way"));
    fx.active(
        ActiveRule::new(ActiveRuleKey::new(rs("b"), "R1"), Severity::Blocker)
            .with_inheritance(Inheritance::Overrides)
            .with_param("max", "10"),
    );

    let second = fx
        .run(|s| {
            s.activate_built_in(
                &built_in,
                &[RuleActivation::create("R1").with_severity(Severity::Minor)],
            )
        })
        .unwrap();
    assert_eq!(rule_sets_of(&second), ["js-builtin", "rs-a"]);
    assert!(second.iter().all(|c| c.change_type == ChangeType::Updated));
    assert!(second.iter().all(|c| c.severity == Severity::Minor));
    assert_eq!(second[1].inheritance, Some(Inheritance::Inherited));
    assert_eq!(fx.active_rule(&rs("b"), "R1").unwrap().severity, Severity::Blocker);
}

#[test]
fn built_in_deactivation_is_forced() {
    let fx = single();
    with_built_in(&fx);
    fx.profile(tenant("a", "A").with_parent("sonar-way"));
    let built_in = RuleSetId::from("js-builtin");
    fx.run(|s| s.activate_built_in(&built_in, &[RuleActivation::create("r1")]))
        .unwrap();

    let changes = fx
        .run(|s| s.deactivate_built_in(&built_in, &[RuleId::from("r1")]))
        .unwrap();
    assert_eq!(rule_sets_of(&changes), ["js-builtin", "rs-a"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Bulk operations, rule deletion, bookkeeping
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn bulk_activation_isolates_rejected_rules() {
    let fx = single();
    fx.rule(js_rule("r2"));
    fx.rule(Rule::new("tpl", "javascript:tpl", "js").as_template());
    let ids = [RuleId::from("r1"), RuleId::from("tpl"), RuleId::from("r2")];

    let result = fx
        .run(|s| s.bulk_activate(&ProfileId::from("p"), &ids, Some(Severity::Critical), None, None))
        .unwrap();
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 1);
    assert!(result.errors[0].starts_with("Rule template"));
    assert_eq!(result.changes.len(), 2);

    let rejected = fx.recorder.rejected.lock().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].error_code, "RULE_TEMPLATE");
    assert_eq!(rejected[0].rule_id, RuleId::from("tpl"));
    drop(rejected);

    let repeat = fx
        .run(|s| {
            s.bulk_activate(
                &ProfileId::from("p"),
                &ids[..1],
                Some(Severity::Critical),
                None,
                None,
            )
        })
        .unwrap();
    assert_eq!((repeat.succeeded, repeat.failed), (0, 0));
}

#[test]
fn bulk_deactivation_counts_protected_rules() {
    let fx = parent_and_child_with(protecting_inherited_rules());
    fx.rule(js_rule("r2"));
    fx.run(|s| {
        s.activate(
            &ProfileId::from("p"),
            &[RuleActivation::create("r1"), RuleActivation::create("r2")],
            None,
        )
    })
    .unwrap();
    activate(&fx, "c", RuleActivation::create("r2").with_severity(Severity::Info)).unwrap();

    let result = fx
        .run(|s| s.bulk_deactivate(&ProfileId::from("c"), &[RuleId::from("r1"), RuleId::from("r2")], None))
        .unwrap();
    // r2 overrides its parent, so it is protected too.
    assert_eq!(result.failed, 2);
    assert_eq!(result.succeeded, 0);
    assert!(fx.active_rule(&rs("c"), "r1").is_some());
}

#[test]
fn delete_rule_removes_every_active_row() {
    let fx = parent_and_child();
    activate(&fx, "p", RuleActivation::create("r1")).unwrap();

    let changes = fx.run(|s| s.delete_rule(&RuleId::from("r1"))).unwrap();
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|c| c.change_type == ChangeType::Deactivated));
    assert!(fx.active_rule(&rs("p"), "r1").is_none());
    assert!(fx.active_rule(&rs("c"), "r1").is_none());
    assert_eq!(fx.recorder.deleted.lock().unwrap()[0].deactivated, 2);
}

#[test]
fn user_operations_stamp_profiles() {
    let fx = single();
    fx.profile(tenant("q", "Other"));

    fx.run(|s| s.activate(&ProfileId::from("p"), &[RuleActivation::create("r1")], Some("alice")))
        .unwrap();
    activate(&fx, "q", RuleActivation::create("r1")).unwrap();

    assert_eq!(fx.stored_profile("p").user_updated_at, Some(NOW));
    assert_eq!(fx.stored_rule_set(&rs("p")).rules_updated_at, Some(NOW));
    assert_eq!(fx.stored_profile("q").user_updated_at, None);
    assert_eq!(fx.stored_rule_set(&rs("q")).rules_updated_at, Some(NOW));
}

#[test]
fn one_event_and_one_log_entry_per_change() {
    let fx = parent_and_child();
    activate(&fx, "p", RuleActivation::create("r1")).unwrap();
    activate(&fx, "p", RuleActivation::create("r1")).unwrap();

    let events = fx.recorder.rules_changed.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].language, "js");
    assert_eq!(events[0].profile_ids, [ProfileId::from("p")]);
    assert_eq!(events[0].changes.len(), 2);

    assert_eq!(fx.change_count(), 2);
    let log = fx
        .db
        .with_connection(|c| changes::query_by_rule_set(c, &RuleSetId::from("rs-c")))
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].change_type, "ACTIVATED");
    assert_eq!(log[0].change().unwrap().inheritance, Some(Inheritance::Inherited));
}
