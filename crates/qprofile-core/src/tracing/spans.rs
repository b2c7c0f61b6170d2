//! Span constructors for activation operations.

/// Span around one activation request, cascade included.
#[macro_export]
macro_rules! activation_span {
    ($rule_id:expr, $ruleset_id:expr) => {
        tracing::info_span!("qprofile.activation", rule_id = %$rule_id, ruleset_id = %$ruleset_id)
    };
}

/// Span around one deactivation request, cascade included.
#[macro_export]
macro_rules! deactivation_span {
    ($rule_id:expr, $ruleset_id:expr, $force:expr) => {
        tracing::info_span!(
            "qprofile.deactivation",
            rule_id = %$rule_id,
            ruleset_id = %$ruleset_id,
            force = $force
        )
    };
}

/// Span around a facade operation on one profile.
#[macro_export]
macro_rules! profile_operation_span {
    ($operation:expr, $target:expr) => {
        tracing::info_span!("qprofile.operation", operation = $operation, subject = %$target)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const ACTIVATION: &str = "qprofile.activation";
    pub const DEACTIVATION: &str = "qprofile.deactivation";
    pub const OPERATION: &str = "qprofile.operation";
}
