//! Domain types shared by the activation engine and its collaborators.

pub mod activation;
pub mod active_rule;
pub mod change;
pub mod collections;
pub mod identifiers;
pub mod profile;
pub mod rule;
pub mod severity;
pub mod variant;

pub use activation::RuleActivation;
pub use active_rule::{ActiveRule, ActiveRuleKey, Inheritance};
pub use change::{ActiveRuleChange, ChangeType, OperationStamp};
pub use collections::{FxHashMap, FxHashSet, ParamMap, ProfileIds};
pub use identifiers::{ProfileId, RuleId, RuleSetId};
pub use profile::{Profile, RuleSet};
pub use rule::{ParamKind, ParamType, Rule, RuleParam, RuleStatus};
pub use severity::Severity;
pub use variant::ParseVariantError;
