//! Shared constants for the rule activation engine.

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project-level config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "qprofile.toml";

/// Default for `activation.allow_disable_inherited_rules`.
pub const DEFAULT_ALLOW_DISABLE_INHERITED_RULES: bool = true;

/// Default database location, relative to the project root.
pub const DEFAULT_DATABASE_PATH: &str = ".qprofile/qprofile.db";

/// Default SQLite busy timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Default log filter when neither `RUST_LOG` nor config provides one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Separator between the values of a multi-valued rule parameter.
pub const MULTI_VALUE_SEPARATOR: char = ',';
