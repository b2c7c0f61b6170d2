//! Free query functions over `&Connection`, grouped by table.

pub mod active_rules;
pub mod changes;
pub mod profiles;
pub mod rules;

use std::str::FromStr;

use qprofile_core::errors::StorageError;

/// Parse a stored text column, reporting the column on failure.
pub(crate) fn parse_column<T: FromStr>(column: &str, value: String) -> Result<T, StorageError> {
    match value.parse() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(StorageError::Corrupt {
            column: column.to_string(),
            value,
        }),
    }
}
