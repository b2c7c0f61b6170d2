//! Error handling for the activation engine.
//! One error enum per subsystem, `thiserror` only.

pub mod activation_error;
pub mod config_error;
pub mod error_code;
pub mod storage_error;

pub use activation_error::ActivationError;
pub use config_error::ConfigError;
pub use error_code::QProfileErrorCode;
pub use storage_error::StorageError;
