//! Re-exports of the collection types used across the engine.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// Profiles sharing one rule set. Exactly one for tenant rule sets,
/// a handful of organization copies for built-in ones.
pub type ProfileIds = SmallVec<[crate::types::ProfileId; 2]>;

/// Ordered parameter map: name to value. Only non-null values are stored.
pub type ParamMap = BTreeMap<String, String>;
