//! Collaborator seams of the activation engine.

pub mod change_sink;
pub mod clock;
pub mod descendant_supplier;
pub mod param_validator;
pub mod profile_repository;
pub mod rule_catalog;

pub use change_sink::ChangeSink;
pub use clock::{Clock, FixedClock, SystemClock};
pub use descendant_supplier::{DescendantSupplier, Descendants};
pub use param_validator::{InvalidValue, ParamValidator};
pub use profile_repository::ProfileRepository;
pub use rule_catalog::RuleCatalog;

/// Everything one activation operation reads from and writes to.
/// Implemented per transaction, so not required to be `Send` or `Sync`.
pub trait ActivationBackend: RuleCatalog + ProfileRepository + DescendantSupplier + ChangeSink {}

impl<T> ActivationBackend for T where T: RuleCatalog + ProfileRepository + DescendantSupplier + ChangeSink {}
