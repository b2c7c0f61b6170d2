//! Synchronous event dispatch.

use std::sync::Arc;

use super::handler::ProfileEventHandler;
use super::types::*;

/// Synchronous dispatcher over a list of handlers. Empty by default.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn ProfileEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ProfileEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// A panicking handler is logged and does not prevent later handlers
    /// from receiving the event.
    fn emit<F: Fn(&dyn ProfileEventHandler)>(&self, event_name: &'static str, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!(event = event_name, "event handler panicked");
            }
        }
    }

    pub fn emit_rules_changed(&self, event: &RulesChangedEvent) {
        self.emit("rules_changed", |h| h.on_rules_changed(event));
    }

    pub fn emit_activation_rejected(&self, event: &ActivationRejectedEvent) {
        self.emit("activation_rejected", |h| h.on_activation_rejected(event));
    }

    pub fn emit_rule_deleted(&self, event: &RuleDeletedEvent) {
        self.emit("rule_deleted", |h| h.on_rule_deleted(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
