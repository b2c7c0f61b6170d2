//! PRAGMA configuration applied to every connection.
//!
//! WAL journal, NORMAL sync, foreign keys ON, configurable busy timeout.

use std::time::Duration;

use qprofile_core::errors::StorageError;
use rusqlite::Connection;

use crate::to_storage_err;

pub fn apply_pragmas(conn: &Connection, busy_timeout_ms: u64) -> Result<(), StorageError> {
    // In-memory databases answer "memory"; either mode is fine.
    let _mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(to_storage_err)?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(to_storage_err)?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(to_storage_err)?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(to_storage_err)?;
    Ok(())
}

/// True when foreign key enforcement is on.
pub fn foreign_keys_enabled(conn: &Connection) -> Result<bool, StorageError> {
    conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))
        .map_err(to_storage_err)
}
