//! Queries for the profile_changes table: append-only change log.

use qprofile_core::errors::StorageError;
use qprofile_core::types::{ActiveRuleChange, OperationStamp, RuleSetId};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::to_storage_err;

/// A change log record. `data_json` is the full change as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileChangeRow {
    pub id: i64,
    pub ruleset_id: String,
    pub rule_id: String,
    pub change_type: String,
    pub user_id: Option<String>,
    pub data_json: String,
    pub created_at: i64,
}

impl ProfileChangeRow {
    /// Decode the recorded change.
    pub fn change(&self) -> Result<ActiveRuleChange, StorageError> {
        serde_json::from_str(&self.data_json).map_err(|e| StorageError::Corrupt {
            column: "profile_changes.data_json".to_string(),
            value: e.to_string(),
        })
    }
}

/// Append one change. Returns the row id.
pub fn insert_change(
    conn: &Connection,
    change: &ActiveRuleChange,
    stamp: &OperationStamp,
) -> Result<i64, StorageError> {
    let data_json = serde_json::to_string(change).map_err(|e| StorageError::SqliteError {
        message: format!("serialize change: {e}"),
    })?;
    conn.prepare_cached(
        "INSERT INTO profile_changes (ruleset_id, rule_id, change_type, user_id, data_json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .map_err(to_storage_err)?
    .execute(params![
        change.key.ruleset_id.as_str(),
        change.key.rule_id.as_str(),
        change.change_type.as_str(),
        stamp.user_id,
        data_json,
        stamp.at,
    ])
    .map_err(to_storage_err)?;
    Ok(conn.last_insert_rowid())
}

/// Changes recorded for a rule set, oldest first.
pub fn query_by_rule_set(conn: &Connection, ruleset_id: &RuleSetId) -> Result<Vec<ProfileChangeRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, ruleset_id, rule_id, change_type, user_id, data_json, created_at
             FROM profile_changes WHERE ruleset_id = ?1 ORDER BY id",
        )
        .map_err(to_storage_err)?;

    let rows = stmt
        .query_map(params![ruleset_id.as_str()], |row| {
            Ok(ProfileChangeRow {
                id: row.get(0)?,
                ruleset_id: row.get(1)?,
                rule_id: row.get(2)?,
                change_type: row.get(3)?,
                user_id: row.get(4)?,
                data_json: row.get(5)?,
                created_at: row.get(6)?,
            })
        })
        .map_err(to_storage_err)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

pub fn count_changes(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM profile_changes", [], |row| row.get(0))
        .map_err(to_storage_err)
}
