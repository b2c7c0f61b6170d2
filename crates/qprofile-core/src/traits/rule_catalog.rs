use crate::errors::StorageError;
use crate::types::{Rule, RuleId};

/// Read-only source of rule definitions and their declared params.
pub trait RuleCatalog {
    /// Rules for the given ids, params included. Unknown ids are skipped;
    /// the caller decides whether a missing rule is fatal.
    fn rules_by_ids(&self, ids: &[RuleId]) -> Result<Vec<Rule>, StorageError>;
}
