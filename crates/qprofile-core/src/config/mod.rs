//! Configuration system.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod activation_config;
pub mod logging_config;
pub mod qprofile_config;
pub mod storage_config;

pub use activation_config::ActivationConfig;
pub use logging_config::LoggingConfig;
pub use qprofile_config::{ConfigOverrides, QProfileConfig};
pub use storage_config::StorageConfig;
