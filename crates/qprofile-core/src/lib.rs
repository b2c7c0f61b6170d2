//! qprofile-core: shared types, traits, errors, config, events, and tracing
//! for the quality profile rule activation engine.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod traits;
pub mod tracing;
pub mod types;

pub use config::QProfileConfig;
pub use errors::{ActivationError, ConfigError, QProfileErrorCode, StorageError};
pub use types::*;
