//! Top-level configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ActivationConfig, LoggingConfig, StorageConfig};
use crate::constants::CONFIG_FILE_NAME;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Caller overrides (applied via `apply_overrides`)
/// 2. Environment variables (`QPROFILE_*`)
/// 3. Project config (`qprofile.toml` in the project root)
/// 4. User config (`~/.qprofile/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QProfileConfig {
    pub activation: ActivationConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Overrides supplied by the embedding service or command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub allow_disable_inherited_rules: Option<bool>,
    pub database_path: Option<String>,
    pub log_filter: Option<String>,
}

impl QProfileConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                Self::merge_toml_file(&mut config, &user_config_path)?;
            }
        }

        let project_config_path = root.join(CONFIG_FILE_NAME);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        tracing::debug!(
            root = %root.display(),
            allow_disable_inherited_rules = config.activation.effective_allow_disable_inherited_rules(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &QProfileConfig) -> Result<(), ConfigError> {
        if config.storage.busy_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "storage.busy_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if let Some(path) = &config.storage.database_path {
            if path.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "storage.database_path".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        if let Some(filter) = &config.logging.filter {
            if !crate::tracing::is_valid_filter(filter) {
                return Err(ConfigError::ValidationFailed {
                    field: "logging.filter".to_string(),
                    message: format!("invalid filter directive: {filter}"),
                });
            }
        }
        Ok(())
    }

    /// Database path resolved against the project root.
    pub fn database_path(&self, root: &Path) -> PathBuf {
        root.join(self.storage.effective_database_path())
    }

    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".qprofile").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut QProfileConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: QProfileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut QProfileConfig, other: &QProfileConfig) {
        if other.activation.allow_disable_inherited_rules.is_some() {
            base.activation.allow_disable_inherited_rules =
                other.activation.allow_disable_inherited_rules;
        }

        if other.storage.database_path.is_some() {
            base.storage.database_path = other.storage.database_path.clone();
        }
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }

        if other.logging.filter.is_some() {
            base.logging.filter = other.logging.filter.clone();
        }
        if other.logging.json.is_some() {
            base.logging.json = other.logging.json;
        }
    }

    /// Pattern: `QPROFILE_<SECTION>_<FIELD>`. Unparseable values are ignored.
    fn apply_env_overrides(config: &mut QProfileConfig) {
        if let Ok(val) = std::env::var("QPROFILE_ACTIVATION_ALLOW_DISABLE_INHERITED_RULES") {
            if let Ok(v) = val.parse::<bool>() {
                config.activation.allow_disable_inherited_rules = Some(v);
            }
        }
        if let Ok(val) = std::env::var("QPROFILE_STORAGE_DATABASE_PATH") {
            config.storage.database_path = Some(val);
        }
        if let Ok(val) = std::env::var("QPROFILE_STORAGE_BUSY_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.storage.busy_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("QPROFILE_LOGGING_FILTER") {
            config.logging.filter = Some(val);
        }
        if let Ok(val) = std::env::var("QPROFILE_LOGGING_JSON") {
            if let Ok(v) = val.parse::<bool>() {
                config.logging.json = Some(v);
            }
        }
    }

    fn apply_overrides(config: &mut QProfileConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.allow_disable_inherited_rules {
            config.activation.allow_disable_inherited_rules = Some(v);
        }
        if let Some(ref v) = overrides.database_path {
            config.storage.database_path = Some(v.clone());
        }
        if let Some(ref v) = overrides.log_filter {
            config.logging.filter = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
