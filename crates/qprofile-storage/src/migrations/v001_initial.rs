//! V001: Initial schema.
//! rules, rule_params, rule_sets, profiles, active_rules, active_rule_params,
//! profile_changes.

pub const MIGRATION_SQL: &str = r#"
-- Rule catalog. Custom rules point at the template they were created from.
CREATE TABLE IF NOT EXISTS rules (
    id TEXT PRIMARY KEY,
    rule_key TEXT NOT NULL UNIQUE,
    language TEXT NOT NULL,
    status TEXT NOT NULL,
    severity TEXT NOT NULL,
    is_template INTEGER NOT NULL DEFAULT 0,
    template_id TEXT REFERENCES rules(id)
) STRICT;

CREATE TABLE IF NOT EXISTS rule_params (
    rule_id TEXT NOT NULL REFERENCES rules(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    param_type TEXT NOT NULL,
    default_value TEXT,
    description TEXT,
    position INTEGER NOT NULL,
    PRIMARY KEY (rule_id, name)
) STRICT;

-- Rule sets hold active rules; several profiles may share one.
CREATE TABLE IF NOT EXISTS rule_sets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    language TEXT NOT NULL,
    is_built_in INTEGER NOT NULL DEFAULT 0,
    rules_updated_at INTEGER
) STRICT;

CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    language TEXT NOT NULL,
    parent_id TEXT REFERENCES profiles(id) ON DELETE SET NULL,
    ruleset_id TEXT NOT NULL REFERENCES rule_sets(id),
    is_built_in INTEGER NOT NULL DEFAULT 0,
    user_updated_at INTEGER
) STRICT;

CREATE INDEX IF NOT EXISTS idx_profiles_parent ON profiles(parent_id)
    WHERE parent_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_profiles_ruleset ON profiles(ruleset_id);

CREATE TABLE IF NOT EXISTS active_rules (
    ruleset_id TEXT NOT NULL REFERENCES rule_sets(id) ON DELETE CASCADE,
    rule_id TEXT NOT NULL REFERENCES rules(id) ON DELETE CASCADE,
    severity TEXT NOT NULL,
    prioritized INTEGER NOT NULL DEFAULT 0,
    inheritance TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (ruleset_id, rule_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_active_rules_rule ON active_rules(rule_id);

-- Only params with a value are stored.
CREATE TABLE IF NOT EXISTS active_rule_params (
    ruleset_id TEXT NOT NULL,
    rule_id TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (ruleset_id, rule_id, name),
    FOREIGN KEY (ruleset_id, rule_id)
        REFERENCES active_rules(ruleset_id, rule_id) ON DELETE CASCADE
) STRICT;

-- Append-only change log. Survives deletion of the rows it describes.
CREATE TABLE IF NOT EXISTS profile_changes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ruleset_id TEXT NOT NULL,
    rule_id TEXT NOT NULL,
    change_type TEXT NOT NULL,
    user_id TEXT,
    data_json TEXT NOT NULL,
    created_at INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_profile_changes_ruleset
    ON profile_changes(ruleset_id, created_at);
"#;
