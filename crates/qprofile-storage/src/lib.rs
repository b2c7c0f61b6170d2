//! qprofile-storage: SQLite persistence for rules, rule sets, profiles and
//! active rules.
//!
//! [`DatabaseManager`] owns the single connection and the transaction
//! boundary; [`SqliteBackend`] implements every collaborator trait the
//! activation engine needs over a connection borrowed for one transaction.

pub mod backend;
pub mod connection;
pub mod migrations;
pub mod queries;

pub use backend::SqliteBackend;
pub use connection::DatabaseManager;

use qprofile_core::errors::StorageError;

/// Map a rusqlite error, keeping lock contention distinguishable.
pub(crate) fn to_storage_err(e: rusqlite::Error) -> StorageError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
            StorageError::DbBusy
        }
        _ => StorageError::SqliteError {
            message: e.to_string(),
        },
    }
}
