//! Equality checks that decide whether a computed change is kept.

use qprofile_core::types::{ActiveRule, Inheritance, Rule};

use super::precedence::Resolved;

/// True when persisting `resolved` with `inheritance` would leave `existing`
/// unchanged.
pub fn is_same(resolved: &Resolved, inheritance: Option<Inheritance>, existing: &ActiveRule) -> bool {
    resolved.severity == existing.severity
        && resolved.prioritized == existing.prioritized
        && inheritance == existing.inheritance
        && resolved.params == existing.params
}

/// True when `resolved` matches the parent's row on severity, prioritized
/// and every declared param.
pub fn is_same_as_parent(rule: &Rule, resolved: &Resolved, parent: &ActiveRule) -> bool {
    resolved.severity == parent.severity
        && resolved.prioritized == parent.prioritized
        && rule.params.iter().all(|param| {
            resolved.params.get(&param.name).map(String::as_str) == parent.param(&param.name)
        })
}

/// Inheritance tag against the parent row: none without a parent.
pub fn tag(rule: &Rule, resolved: &Resolved, parent: Option<&ActiveRule>) -> Option<Inheritance> {
    parent.map(|parent| {
        if is_same_as_parent(rule, resolved, parent) {
            Inheritance::Inherited
        } else {
            Inheritance::Overrides
        }
    })
}
