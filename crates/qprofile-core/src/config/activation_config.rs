//! Activation configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ALLOW_DISABLE_INHERITED_RULES;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ActivationConfig {
    /// Allow deactivating an inherited rule directly on a child profile.
    /// Default: true.
    pub allow_disable_inherited_rules: Option<bool>,
}

impl ActivationConfig {
    pub fn effective_allow_disable_inherited_rules(&self) -> bool {
        self.allow_disable_inherited_rules
            .unwrap_or(DEFAULT_ALLOW_DISABLE_INHERITED_RULES)
    }
}
