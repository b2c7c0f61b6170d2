use crate::errors::StorageError;
use crate::types::{ActiveRule, Profile, RuleId};

/// Profiles below a set of parents, with their active rules for the
/// rules of the operation.
#[derive(Debug, Clone, Default)]
pub struct Descendants {
    pub profiles: Vec<Profile>,
    pub active_rules: Vec<ActiveRule>,
}

/// Lazily fetches descendant profiles the first time a cascade needs them.
pub trait DescendantSupplier {
    /// All descendants (children, grandchildren, ...) of `parents`, and
    /// their active rules restricted to `rule_ids`.
    fn supply(&self, parents: &[Profile], rule_ids: &[RuleId]) -> Result<Descendants, StorageError>;
}
