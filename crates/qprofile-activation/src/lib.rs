//! qprofile-activation: activation context, rule activator and the profile
//! rules facade.
//!
//! The activator owns no I/O. It reads from an [`ActivationContext`] loaded
//! up front, and writes through the [`qprofile_core::traits::ChangeSink`]
//! inside the caller's transaction.

pub mod activator;
pub mod context;
pub mod params;
pub mod service;

pub use activator::RuleActivator;
pub use context::{ActivationContext, Cursor};
pub use params::TypeValidations;
pub use service::{BulkChangeResult, QualityProfileRules};
