//! Queries for the rules and rule_params tables.

use qprofile_core::errors::StorageError;
use qprofile_core::types::{Rule, RuleId, RuleParam, RuleStatus};
use rusqlite::{params, Connection, OptionalExtension};

use super::parse_column;
use crate::to_storage_err;

/// A rules row before its text columns are parsed.
#[derive(Debug, Clone)]
pub struct RuleRow {
    pub id: String,
    pub rule_key: String,
    pub language: String,
    pub status: String,
    pub severity: String,
    pub is_template: bool,
    pub template_id: Option<String>,
}

impl RuleRow {
    fn into_rule(self, params: Vec<RuleParam>) -> Result<Rule, StorageError> {
        Ok(Rule {
            id: RuleId::new(self.id),
            key: self.rule_key,
            language: self.language,
            status: parse_column("rules.status", self.status)?,
            severity: parse_column("rules.severity", self.severity)?,
            is_template: self.is_template,
            template_id: self.template_id.map(RuleId::new),
            params,
        })
    }
}

/// Insert a rule and its declared params.
pub fn insert_rule(conn: &Connection, rule: &Rule) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO rules (id, rule_key, language, status, severity, is_template, template_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            rule.id.as_str(),
            rule.key,
            rule.language,
            rule.status.as_str(),
            rule.severity.as_str(),
            rule.is_template,
            rule.template_id.as_ref().map(RuleId::as_str),
        ],
    )
    .map_err(to_storage_err)?;

    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO rule_params (rule_id, name, param_type, default_value, description, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(to_storage_err)?;
    for (position, param) in rule.params.iter().enumerate() {
        stmt.execute(params![
            rule.id.as_str(),
            param.name,
            param.param_type.to_string(),
            param.default_value,
            param.description,
            position as i64,
        ])
        .map_err(to_storage_err)?;
    }
    Ok(())
}

pub fn update_rule_status(conn: &Connection, id: &RuleId, status: RuleStatus) -> Result<(), StorageError> {
    let updated = conn
        .execute(
            "UPDATE rules SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.as_str()],
        )
        .map_err(to_storage_err)?;
    if updated == 0 {
        return Err(StorageError::NotFound {
            entity: "rule".to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn get_rule(conn: &Connection, id: &RuleId) -> Result<Option<Rule>, StorageError> {
    let row = conn
        .prepare_cached(
            "SELECT id, rule_key, language, status, severity, is_template, template_id
             FROM rules WHERE id = ?1",
        )
        .map_err(to_storage_err)?
        .query_row(params![id.as_str()], |row| {
            Ok(RuleRow {
                id: row.get(0)?,
                rule_key: row.get(1)?,
                language: row.get(2)?,
                status: row.get(3)?,
                severity: row.get(4)?,
                is_template: row.get(5)?,
                template_id: row.get(6)?,
            })
        })
        .optional()
        .map_err(to_storage_err)?;

    match row {
        Some(row) => {
            let params = get_rule_params(conn, id)?;
            row.into_rule(params).map(Some)
        }
        None => Ok(None),
    }
}

/// Rules for the given ids, in the order given. Unknown ids are skipped.
pub fn get_rules_by_ids(conn: &Connection, ids: &[RuleId]) -> Result<Vec<Rule>, StorageError> {
    let mut rules = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(rule) = get_rule(conn, id)? {
            rules.push(rule);
        }
    }
    Ok(rules)
}

/// Declared params of a rule, in declaration order.
pub fn get_rule_params(conn: &Connection, rule_id: &RuleId) -> Result<Vec<RuleParam>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT name, param_type, default_value, description
             FROM rule_params WHERE rule_id = ?1 ORDER BY position",
        )
        .map_err(to_storage_err)?;

    let rows = stmt
        .query_map(params![rule_id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })
        .map_err(to_storage_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_storage_err)?;

    rows.into_iter()
        .map(|(name, param_type, default_value, description)| {
            Ok(RuleParam {
                name,
                param_type: parse_column("rule_params.param_type", param_type)?,
                default_value,
                description,
            })
        })
        .collect()
}

pub fn count_rules(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM rules", [], |row| row.get(0))
        .map_err(to_storage_err)
}
