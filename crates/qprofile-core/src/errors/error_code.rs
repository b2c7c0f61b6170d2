//! QProfileErrorCode trait for callers that surface errors across an API boundary.

/// Every error enum implements this to provide a stable, structured
/// error code string alongside its human-readable message.
pub trait QProfileErrorCode {
    /// Returns the error code string (e.g., "RULE_REMOVED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Request validation.
pub const RULE_REMOVED: &str = "RULE_REMOVED";
pub const RULE_TEMPLATE: &str = "RULE_TEMPLATE";
pub const LANGUAGE_MISMATCH: &str = "LANGUAGE_MISMATCH";
pub const INVALID_PARAM: &str = "INVALID_PARAM";
pub const INHERITED_RULE_PROTECTED: &str = "INHERITED_RULE_PROTECTED";
pub const BUILT_IN_READ_ONLY: &str = "BUILT_IN_READ_ONLY";

// Preconditions.
pub const CONTEXT_PRECONDITION: &str = "CONTEXT_PRECONDITION";
pub const RULE_NOT_FOUND: &str = "RULE_NOT_FOUND";

// Collaborators.
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_BUSY: &str = "DB_BUSY";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
