//! Observability: `tracing` with `EnvFilter`, per-module log levels,
//! and span constructors for activation operations.

pub mod setup;
pub mod spans;

pub use setup::{init_tracing, is_valid_filter};
