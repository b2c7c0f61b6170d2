//! Activation errors: rejected requests, context preconditions, collaborator failures.

use super::error_code::{self, QProfileErrorCode};
use super::StorageError;

/// Errors that can occur while activating or deactivating rules.
///
/// Request errors (see [`ActivationError::is_request_error`]) reject a single
/// request before anything is persisted for it. Every other variant is fatal
/// to the whole operation and the caller's transaction must roll back.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("Rule was removed: {rule_key}")]
    RuleRemoved { rule_key: String },

    #[error("Rule template can't be activated on a Quality profile: {rule_key}")]
    RuleTemplate { rule_key: String },

    #[error("{rule_language} rule {rule_key} cannot be activated on {profile_language} profile {profile_name}")]
    LanguageMismatch {
        rule_language: String,
        rule_key: String,
        profile_language: String,
        profile_name: String,
    },

    #[error("Invalid value '{value}' for parameter '{param}' of rule {rule_key}: {message}")]
    InvalidParam {
        rule_key: String,
        param: String,
        value: String,
        message: String,
    },

    #[error("Cannot deactivate inherited rule '{rule_key}'")]
    InheritedRuleProtected { rule_key: String, profile_name: String },

    #[error("The built-in profile {profile_name} is read-only and can't be updated")]
    BuiltInProfileReadOnly { profile_name: String },

    #[error("Rule {rule_id} was not loaded into the activation context")]
    RuleNotLoaded { rule_id: String },

    #[error("Rule set {ruleset_id} was not loaded into the activation context")]
    RuleSetNotLoaded { ruleset_id: String },

    #[error("Profile {profile_id} was not loaded into the activation context")]
    ProfileNotLoaded { profile_id: String },

    #[error("Child profile {profile_id} is built-in and cannot inherit")]
    ChildIsBuiltIn { profile_id: String },

    #[error("Rule set {ruleset_id} is not built-in")]
    NotBuiltIn { ruleset_id: String },

    #[error("Profile {profile_id} is built-in")]
    UnexpectedBuiltIn { profile_id: String },

    #[error("Rules not found in catalog: {}", rule_ids.join(", "))]
    RuleNotFound { rule_ids: Vec<String> },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ActivationError {
    /// True for errors that reject one request without compromising the
    /// rest of the operation.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::RuleRemoved { .. }
                | Self::RuleTemplate { .. }
                | Self::LanguageMismatch { .. }
                | Self::InvalidParam { .. }
                | Self::InheritedRuleProtected { .. }
                | Self::BuiltInProfileReadOnly { .. }
        )
    }
}

impl QProfileErrorCode for ActivationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RuleRemoved { .. } => error_code::RULE_REMOVED,
            Self::RuleTemplate { .. } => error_code::RULE_TEMPLATE,
            Self::LanguageMismatch { .. } => error_code::LANGUAGE_MISMATCH,
            Self::InvalidParam { .. } => error_code::INVALID_PARAM,
            Self::InheritedRuleProtected { .. } => error_code::INHERITED_RULE_PROTECTED,
            Self::BuiltInProfileReadOnly { .. } => error_code::BUILT_IN_READ_ONLY,
            Self::RuleNotLoaded { .. }
            | Self::RuleSetNotLoaded { .. }
            | Self::ProfileNotLoaded { .. }
            | Self::ChildIsBuiltIn { .. }
            | Self::NotBuiltIn { .. }
            | Self::UnexpectedBuiltIn { .. } => error_code::CONTEXT_PRECONDITION,
            Self::RuleNotFound { .. } => error_code::RULE_NOT_FOUND,
            Self::Storage(e) => e.error_code(),
        }
    }
}
