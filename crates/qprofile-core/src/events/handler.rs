//! ProfileEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Handlers override only the events they care about.
pub trait ProfileEventHandler: Send + Sync {
    fn on_rules_changed(&self, _event: &RulesChangedEvent) {}
    fn on_activation_rejected(&self, _event: &ActivationRejectedEvent) {}
    fn on_rule_deleted(&self, _event: &RuleDeletedEvent) {}
}
