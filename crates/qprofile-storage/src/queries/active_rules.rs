//! Queries for the active_rules and active_rule_params tables.

use qprofile_core::errors::StorageError;
use qprofile_core::types::{ActiveRule, ActiveRuleKey, ParamMap, RuleId, RuleSetId};
use rusqlite::{params, Connection, OptionalExtension};

use super::parse_column;
use crate::to_storage_err;

/// An active_rules row before its text columns are parsed.
#[derive(Debug, Clone)]
pub struct ActiveRuleRow {
    pub ruleset_id: String,
    pub rule_id: String,
    pub severity: String,
    pub prioritized: bool,
    pub inheritance: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ActiveRuleRow {
    fn into_active_rule(self, params: ParamMap) -> Result<ActiveRule, StorageError> {
        Ok(ActiveRule {
            key: ActiveRuleKey::new(self.ruleset_id, self.rule_id),
            severity: parse_column("active_rules.severity", self.severity)?,
            prioritized: self.prioritized,
            inheritance: self
                .inheritance
                .map(|v| parse_column("active_rules.inheritance", v))
                .transpose()?,
            params,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ACTIVE_RULE_COLUMNS: &str =
    "ruleset_id, rule_id, severity, prioritized, inheritance, created_at, updated_at";

fn row_from(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActiveRuleRow> {
    Ok(ActiveRuleRow {
        ruleset_id: row.get(0)?,
        rule_id: row.get(1)?,
        severity: row.get(2)?,
        prioritized: row.get(3)?,
        inheritance: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn hydrate(conn: &Connection, rows: Vec<ActiveRuleRow>) -> Result<Vec<ActiveRule>, StorageError> {
    rows.into_iter()
        .map(|row| {
            let key = ActiveRuleKey::new(row.ruleset_id.as_str(), row.rule_id.as_str());
            let params = get_params(conn, &key)?;
            row.into_active_rule(params)
        })
        .collect()
}

// ─── Reads ───────────────────────────────────────────────────────────

pub fn get_active_rule(conn: &Connection, key: &ActiveRuleKey) -> Result<Option<ActiveRule>, StorageError> {
    let row = conn
        .prepare_cached(&format!(
            "SELECT {ACTIVE_RULE_COLUMNS} FROM active_rules WHERE ruleset_id = ?1 AND rule_id = ?2"
        ))
        .map_err(to_storage_err)?
        .query_row(params![key.ruleset_id.as_str(), key.rule_id.as_str()], row_from)
        .optional()
        .map_err(to_storage_err)?;

    match row {
        Some(row) => Ok(hydrate(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Active rules for every (rule set, rule) pair of the cross product.
pub fn get_active_rules(
    conn: &Connection,
    rule_ids: &[RuleId],
    ruleset_ids: &[RuleSetId],
) -> Result<Vec<ActiveRule>, StorageError> {
    let mut active_rules = Vec::new();
    for ruleset_id in ruleset_ids {
        for rule_id in rule_ids {
            let key = ActiveRuleKey::new(ruleset_id.clone(), rule_id.clone());
            if let Some(active_rule) = get_active_rule(conn, &key)? {
                active_rules.push(active_rule);
            }
        }
    }
    Ok(active_rules)
}

/// Every active row of a rule, ordered by rule set.
pub fn get_active_rules_of_rule(conn: &Connection, rule_id: &RuleId) -> Result<Vec<ActiveRule>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {ACTIVE_RULE_COLUMNS} FROM active_rules WHERE rule_id = ?1 ORDER BY ruleset_id"
        ))
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![rule_id.as_str()], row_from)
        .map_err(to_storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_storage_err)?;
    hydrate(conn, rows)
}

pub fn get_active_rule_ids(conn: &Connection, ruleset_id: &RuleSetId) -> Result<Vec<RuleId>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT rule_id FROM active_rules WHERE ruleset_id = ?1 ORDER BY rule_id")
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![ruleset_id.as_str()], |row| row.get::<_, String>(0))
        .map_err(to_storage_err)?;
    rows.map(|r| r.map(RuleId::new).map_err(to_storage_err))
        .collect()
}

pub fn get_params(conn: &Connection, key: &ActiveRuleKey) -> Result<ParamMap, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT name, value FROM active_rule_params
             WHERE ruleset_id = ?1 AND rule_id = ?2 ORDER BY name",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![key.ruleset_id.as_str(), key.rule_id.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(to_storage_err)?;
    rows.collect::<Result<ParamMap, _>>().map_err(to_storage_err)
}

pub fn count_active_rules(conn: &Connection, ruleset_id: &RuleSetId) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM active_rules WHERE ruleset_id = ?1",
        params![ruleset_id.as_str()],
        |row| row.get(0),
    )
    .map_err(to_storage_err)
}

// ─── Writes ──────────────────────────────────────────────────────────

/// Insert an active rule and its params.
pub fn insert_active_rule(conn: &Connection, active_rule: &ActiveRule) -> Result<(), StorageError> {
    conn.execute(
        &format!("INSERT INTO active_rules ({ACTIVE_RULE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        params![
            active_rule.key.ruleset_id.as_str(),
            active_rule.key.rule_id.as_str(),
            active_rule.severity.as_str(),
            active_rule.prioritized,
            active_rule.inheritance.map(|i| i.as_str()),
            active_rule.created_at,
            active_rule.updated_at,
        ],
    )
    .map_err(to_storage_err)?;
    replace_params(conn, &active_rule.key, &active_rule.params)
}

/// Update severity, prioritized, inheritance and params. `created_at` is
/// left alone.
pub fn update_active_rule(conn: &Connection, active_rule: &ActiveRule) -> Result<(), StorageError> {
    let updated = conn
        .execute(
            "UPDATE active_rules
             SET severity = ?1, prioritized = ?2, inheritance = ?3, updated_at = ?4
             WHERE ruleset_id = ?5 AND rule_id = ?6",
            params![
                active_rule.severity.as_str(),
                active_rule.prioritized,
                active_rule.inheritance.map(|i| i.as_str()),
                active_rule.updated_at,
                active_rule.key.ruleset_id.as_str(),
                active_rule.key.rule_id.as_str(),
            ],
        )
        .map_err(to_storage_err)?;
    if updated == 0 {
        return Err(not_found(&active_rule.key));
    }
    replace_params(conn, &active_rule.key, &active_rule.params)
}

/// Delete an active rule. Its params go with it.
pub fn delete_active_rule(conn: &Connection, key: &ActiveRuleKey) -> Result<(), StorageError> {
    let deleted = conn
        .execute(
            "DELETE FROM active_rules WHERE ruleset_id = ?1 AND rule_id = ?2",
            params![key.ruleset_id.as_str(), key.rule_id.as_str()],
        )
        .map_err(to_storage_err)?;
    if deleted == 0 {
        return Err(not_found(key));
    }
    Ok(())
}

fn replace_params(conn: &Connection, key: &ActiveRuleKey, values: &ParamMap) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM active_rule_params WHERE ruleset_id = ?1 AND rule_id = ?2",
        params![key.ruleset_id.as_str(), key.rule_id.as_str()],
    )
    .map_err(to_storage_err)?;

    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO active_rule_params (ruleset_id, rule_id, name, value) VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(to_storage_err)?;
    for (name, value) in values {
        stmt.execute(params![key.ruleset_id.as_str(), key.rule_id.as_str(), name, value])
            .map_err(to_storage_err)?;
    }
    Ok(())
}

fn not_found(key: &ActiveRuleKey) -> StorageError {
    StorageError::NotFound {
        entity: "active rule".to_string(),
        id: format!("{}/{}", key.ruleset_id, key.rule_id),
    }
}
