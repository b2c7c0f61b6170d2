//! Queries for the rule_sets and profiles tables.

use qprofile_core::errors::StorageError;
use qprofile_core::types::{Profile, ProfileId, RuleSet, RuleSetId};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::to_storage_err;

const PROFILE_COLUMNS: &str =
    "id, name, language, parent_id, ruleset_id, is_built_in, user_updated_at";

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: ProfileId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        language: row.get(2)?,
        parent_id: row.get::<_, Option<String>>(3)?.map(ProfileId::new),
        ruleset_id: RuleSetId::new(row.get::<_, String>(4)?),
        is_built_in: row.get(5)?,
        user_updated_at: row.get(6)?,
    })
}

// ─── Rule sets ───────────────────────────────────────────────────────

pub fn insert_rule_set(conn: &Connection, rule_set: &RuleSet) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO rule_sets (id, name, language, is_built_in, rules_updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            rule_set.id.as_str(),
            rule_set.name,
            rule_set.language,
            rule_set.is_built_in,
            rule_set.rules_updated_at,
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_rule_set(conn: &Connection, id: &RuleSetId) -> Result<Option<RuleSet>, StorageError> {
    conn.prepare_cached(
        "SELECT id, name, language, is_built_in, rules_updated_at FROM rule_sets WHERE id = ?1",
    )
    .map_err(to_storage_err)?
    .query_row(params![id.as_str()], |row| {
        Ok(RuleSet {
            id: RuleSetId::new(row.get::<_, String>(0)?),
            name: row.get(1)?,
            language: row.get(2)?,
            is_built_in: row.get(3)?,
            rules_updated_at: row.get(4)?,
        })
    })
    .optional()
    .map_err(to_storage_err)
}

/// Stamp the time the rule set's active rules last changed.
pub fn touch_rule_set(conn: &Connection, id: &RuleSetId, at: i64) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE rule_sets SET rules_updated_at = ?1 WHERE id = ?2",
        params![at, id.as_str()],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

// ─── Profiles ────────────────────────────────────────────────────────

pub fn insert_profile(conn: &Connection, profile: &Profile) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO profiles (id, name, language, parent_id, ruleset_id, is_built_in, user_updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            profile.id.as_str(),
            profile.name,
            profile.language,
            profile.parent_id.as_ref().map(ProfileId::as_str),
            profile.ruleset_id.as_str(),
            profile.is_built_in,
            profile.user_updated_at,
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

pub fn get_profile(conn: &Connection, id: &ProfileId) -> Result<Option<Profile>, StorageError> {
    conn.prepare_cached(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"))
        .map_err(to_storage_err)?
        .query_row(params![id.as_str()], profile_from_row)
        .optional()
        .map_err(to_storage_err)
}

/// Profiles pointing at a rule set, ordered by name then id.
pub fn get_profiles_by_rule_set(conn: &Connection, ruleset_id: &RuleSetId) -> Result<Vec<Profile>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE ruleset_id = ?1 ORDER BY name, id"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![ruleset_id.as_str()], profile_from_row)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Every descendant of `parent_id` (children, grandchildren, ...), ordered
/// by name then id.
pub fn get_descendants(conn: &Connection, parent_id: &ProfileId) -> Result<Vec<Profile>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "WITH RECURSIVE tree(id) AS (
                 SELECT id FROM profiles WHERE parent_id = ?1
                 UNION
                 SELECT p.id FROM profiles p JOIN tree t ON p.parent_id = t.id
             )
             SELECT {PROFILE_COLUMNS} FROM profiles
             WHERE id IN (SELECT id FROM tree)
             ORDER BY name, id"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![parent_id.as_str()], profile_from_row)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Stamp `user_updated_at` on each profile.
pub fn touch_profiles(conn: &Connection, ids: &[ProfileId], at: i64) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached("UPDATE profiles SET user_updated_at = ?1 WHERE id = ?2")
        .map_err(to_storage_err)?;
    for id in ids {
        stmt.execute(params![at, id.as_str()])
            .map_err(to_storage_err)?;
    }
    Ok(())
}
