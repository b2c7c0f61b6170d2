use crate::types::RuleParam;

/// A value does not fit its parameter type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidValue {
    pub message: String,
}

impl InvalidValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Checks a resolved parameter value against the parameter's declared type.
pub trait ParamValidator: Send + Sync {
    fn validate(&self, param: &RuleParam, value: &str) -> Result<(), InvalidValue>;
}
