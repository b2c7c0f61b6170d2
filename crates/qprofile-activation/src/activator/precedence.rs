//! Severity, prioritized and parameter precedence.
//!
//! Every field is resolved from an ordered list of candidates, highest
//! priority first; the first present candidate wins. The candidate lists
//! depend on one of three mutually exclusive modes.

use qprofile_core::types::{ActiveRule, ParamMap, Rule, RuleActivation, RuleParam, RuleSet, Severity};

/// How a request is resolved, selected before any other decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Discard local overrides: parent value, else rule default.
    Reset,
    /// Built-in rule set: requested value, else rule default.
    BuiltIn,
    /// Tenant profile: requested, own override, parent, rule default.
    Tenant,
}

impl ResolutionMode {
    pub fn select(request: &RuleActivation, rule_set: &RuleSet) -> Self {
        if request.reset {
            Self::Reset
        } else if rule_set.is_built_in {
            Self::BuiltIn
        } else {
            Self::Tenant
        }
    }
}

/// The state a request resolves to at one rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub severity: Severity,
    pub prioritized: bool,
    /// Declared params whose value resolved to something.
    pub params: ParamMap,
}

impl Resolved {
    pub fn of_active_rule(active_rule: &ActiveRule) -> Self {
        Self {
            severity: active_rule.severity,
            prioritized: active_rule.prioritized,
            params: active_rule.params.clone(),
        }
    }
}

/// Everything precedence may draw from at one cursor position.
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'i> {
    pub request: &'i RuleActivation,
    pub rule: &'i Rule,
    pub active: Option<&'i ActiveRule>,
    pub parent: Option<&'i ActiveRule>,
}

/// First present candidate, left to right.
pub fn first_present<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

pub fn resolve(mode: ResolutionMode, inputs: &Inputs<'_>) -> Resolved {
    let params = inputs
        .rule
        .params
        .iter()
        .filter_map(|param| {
            resolve_param(mode, inputs, param).map(|value| (param.name.clone(), value))
        })
        .collect();

    Resolved {
        severity: resolve_severity(mode, inputs),
        prioritized: resolve_prioritized(mode, inputs),
        params,
    }
}

pub fn resolve_severity(mode: ResolutionMode, inputs: &Inputs<'_>) -> Severity {
    let Inputs {
        request,
        rule,
        active,
        parent,
    } = *inputs;
    let parent_value = parent.map(|p| p.severity);
    let candidates = match (mode, active) {
        (ResolutionMode::Reset, _) => vec![parent_value],
        (ResolutionMode::BuiltIn, _) => vec![request.severity],
        (ResolutionMode::Tenant, Some(active)) => vec![
            request.severity,
            active.does_override().then_some(active.severity),
            parent_value.or(Some(active.severity)),
        ],
        (ResolutionMode::Tenant, None) => vec![request.severity, parent_value],
    };
    first_present(candidates).unwrap_or(rule.severity)
}

pub fn resolve_prioritized(mode: ResolutionMode, inputs: &Inputs<'_>) -> bool {
    let Inputs {
        request,
        active,
        parent,
        ..
    } = *inputs;
    let parent_value = parent.map(|p| p.prioritized);
    let candidates = match (mode, active) {
        (ResolutionMode::Reset, _) => vec![parent_value],
        (ResolutionMode::BuiltIn, _) => vec![request.prioritized],
        (ResolutionMode::Tenant, Some(active)) => vec![
            request.prioritized,
            active.does_override().then_some(active.prioritized),
            parent_value.or(Some(active.prioritized)),
        ],
        (ResolutionMode::Tenant, None) => vec![request.prioritized, parent_value],
    };
    first_present(candidates).unwrap_or(false)
}

/// `None` means the param is not stored.
pub fn resolve_param(mode: ResolutionMode, inputs: &Inputs<'_>, param: &RuleParam) -> Option<String> {
    let Inputs {
        request,
        rule,
        active,
        parent,
    } = *inputs;
    let name = param.name.as_str();
    // Custom rules keep the values given when they were instantiated.
    let requested = (!rule.is_custom()).then(|| request.requested_param(name)).flatten();
    let has_requested = !rule.is_custom() && request.has_requested_param(name);
    let parent_value = parent.and_then(|p| p.param(name));
    let default = param.default_value.as_deref();

    let candidates = match (mode, active) {
        (ResolutionMode::Reset, _) => vec![parent_value, default],
        (ResolutionMode::BuiltIn, _) => vec![requested, default],
        (ResolutionMode::Tenant, _) if has_requested => vec![requested, parent_value, default],
        (ResolutionMode::Tenant, Some(active)) => {
            let own = active.param(name);
            vec![
                own.filter(|_| active.does_override()),
                parent_value.or(own),
                default,
            ]
        }
        (ResolutionMode::Tenant, None) => vec![parent_value, default],
    };
    first_present(candidates).map(str::to_string)
}
