//! SQLite-backed pattern catalog.
//!
//! The store is read-only during a scan: patterns are loaded once, and
//! usage statistics are written back only after finalization. Rule
//! configuration payloads are stored as JSON and validated at load time;
//! a pattern with an invalid payload is disabled with a loud warning, and
//! the scan proceeds for all other patterns.

use crate::catalog::types::{
    EnsembleRule, Pattern, Priority, RuleConfig, UsageStats, VotePolicy,
};
use crate::error::{LintError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use tracing::{debug, warn};

const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS patterns (
    name TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    priority TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    rationale TEXT NOT NULL DEFAULT '',
    fix_template TEXT,
    enabled INTEGER NOT NULL DEFAULT 1,
    min_votes INTEGER NOT NULL DEFAULT 1,
    confidence_threshold REAL NOT NULL DEFAULT 0.5,
    forbidden TEXT,
    required TEXT,
    times_checked INTEGER NOT NULL DEFAULT 0,
    times_matched INTEGER NOT NULL DEFAULT 0,
    last_used TEXT
) STRICT;

CREATE TABLE IF NOT EXISTS ensemble_rules (
    id TEXT PRIMARY KEY,
    pattern_name TEXT NOT NULL REFERENCES patterns(name),
    kind TEXT NOT NULL,
    config TEXT NOT NULL,
    weight INTEGER NOT NULL DEFAULT 1,
    enabled INTEGER NOT NULL DEFAULT 1
) STRICT;

CREATE INDEX IF NOT EXISTS idx_rules_pattern ON ensemble_rules(pattern_name);

CREATE VIRTUAL TABLE IF NOT EXISTS patterns_fts
    USING fts5(name, description, rationale);
"#;

/// Result of loading the catalog: active patterns plus the names and
/// reasons of patterns disabled for configuration errors.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub patterns: Vec<Pattern>,
    pub disabled: Vec<(String, String)>,
}

pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open (or create) a catalog database and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| LintError::CatalogUnavailable(e.to_string()))?;
        Self::init(conn)
    }

    /// In-memory catalog, for tests and ad-hoc imports.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| LintError::CatalogUnavailable(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(MIGRATION_SQL)
            .map_err(|e| LintError::CatalogUnavailable(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Insert a pattern with its ensemble rules. Fails on duplicate name.
    pub fn insert_pattern(&self, pattern: &Pattern) -> Result<()> {
        self.conn.execute(
            "INSERT INTO patterns
               (name, category, priority, description, rationale, fix_template,
                enabled, min_votes, confidence_threshold, forbidden, required,
                times_checked, times_matched, last_used)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                pattern.name,
                pattern.category,
                pattern.priority.as_str(),
                pattern.description,
                pattern.rationale,
                pattern.fix_template,
                pattern.enabled,
                pattern.policy.min_votes,
                pattern.policy.confidence_threshold,
                pattern.forbidden,
                pattern.required,
                pattern.usage.times_checked,
                pattern.usage.times_matched,
                pattern.usage.last_used.map(|t| t.to_rfc3339()),
            ],
        )?;
        self.conn.execute(
            "INSERT INTO patterns_fts (name, description, rationale) VALUES (?1, ?2, ?3)",
            params![pattern.name, pattern.description, pattern.rationale],
        )?;

        for rule in &pattern.rules {
            let config = serde_json::to_string(&rule.config)?;
            self.conn.execute(
                "INSERT INTO ensemble_rules (id, pattern_name, kind, config, weight, enabled)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    rule.id,
                    pattern.name,
                    rule.kind().as_str(),
                    config,
                    rule.weight,
                    rule.enabled,
                ],
            )?;
        }
        debug!(pattern = %pattern.name, rules = pattern.rules.len(), "Pattern inserted");
        Ok(())
    }

    /// Import a whole catalog, skipping patterns that already exist.
    pub fn import(&self, patterns: &[Pattern]) -> Result<usize> {
        let mut imported = 0;
        for pattern in patterns {
            if self.pattern_exists(&pattern.name)? {
                continue;
            }
            self.insert_pattern(pattern)?;
            imported += 1;
        }
        Ok(imported)
    }

    pub fn pattern_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM patterns WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Soft-disable (or re-enable) a pattern. Patterns referenced by
    /// historical violations are never hard-deleted.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE patterns SET enabled = ?2 WHERE name = ?1",
            params![name, enabled],
        )?;
        if changed == 0 {
            return Err(LintError::CatalogUnavailable(format!(
                "no such pattern: {name}"
            )));
        }
        Ok(())
    }

    /// Load all enabled patterns with their enabled rules, compiling and
    /// validating every rule configuration once.
    pub fn load_enabled(&self) -> Result<LoadReport> {
        let mut stmt = self.conn.prepare(
            "SELECT name, category, priority, description, rationale, fix_template,
                    min_votes, confidence_threshold, forbidden, required,
                    times_checked, times_matched, last_used
             FROM patterns WHERE enabled = 1 ORDER BY name",
        )?;

        struct Row {
            name: String,
            category: String,
            priority: String,
            description: String,
            rationale: String,
            fix_template: Option<String>,
            min_votes: u32,
            confidence_threshold: f64,
            forbidden: Option<String>,
            required: Option<String>,
            times_checked: u64,
            times_matched: u64,
            last_used: Option<String>,
        }

        let rows = stmt
            .query_map([], |row| {
                Ok(Row {
                    name: row.get(0)?,
                    category: row.get(1)?,
                    priority: row.get(2)?,
                    description: row.get(3)?,
                    rationale: row.get(4)?,
                    fix_template: row.get(5)?,
                    min_votes: row.get(6)?,
                    confidence_threshold: row.get(7)?,
                    forbidden: row.get(8)?,
                    required: row.get(9)?,
                    times_checked: row.get(10)?,
                    times_matched: row.get(11)?,
                    last_used: row.get(12)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut report = LoadReport::default();
        'patterns: for row in rows {
            let Some(priority) = Priority::parse(&row.priority) else {
                let reason = format!("unknown priority '{}'", row.priority);
                warn!(pattern = %row.name, %reason, "Disabling pattern with invalid configuration");
                report.disabled.push((row.name, reason));
                continue;
            };

            let policy = VotePolicy {
                min_votes: row.min_votes,
                confidence_threshold: row.confidence_threshold,
            };
            if let Err(reason) = policy.validate() {
                warn!(pattern = %row.name, %reason, "Disabling pattern with invalid configuration");
                report.disabled.push((row.name, reason));
                continue;
            }

            let mut pattern = Pattern {
                name: row.name.clone(),
                category: row.category,
                priority,
                description: row.description,
                rationale: row.rationale,
                fix_template: row.fix_template,
                enabled: true,
                policy,
                rules: Vec::new(),
                forbidden: row.forbidden,
                required: row.required,
                usage: UsageStats {
                    times_checked: row.times_checked,
                    times_matched: row.times_matched,
                    last_used: row
                        .last_used
                        .as_deref()
                        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                        .map(|t| t.with_timezone(&Utc)),
                },
            };

            for (rule_id, config_json, weight) in self.rule_rows(&row.name)? {
                let config: RuleConfig = match serde_json::from_str(&config_json) {
                    Ok(c) => c,
                    Err(e) => {
                        let reason = format!("rule '{rule_id}': unparseable config: {e}");
                        warn!(pattern = %row.name, %reason, "Disabling pattern with invalid configuration");
                        report.disabled.push((row.name.clone(), reason));
                        continue 'patterns;
                    }
                };
                match EnsembleRule::new(rule_id.clone(), &config, weight) {
                    Ok(rule) => pattern.rules.push(rule),
                    Err(e) => {
                        let reason = format!("rule '{rule_id}': {e}");
                        warn!(pattern = %row.name, %reason, "Disabling pattern with invalid configuration");
                        report.disabled.push((row.name.clone(), reason));
                        continue 'patterns;
                    }
                }
            }

            report.patterns.push(pattern);
        }

        debug!(
            loaded = report.patterns.len(),
            disabled = report.disabled.len(),
            "Catalog loaded"
        );
        Ok(report)
    }

    fn rule_rows(&self, pattern_name: &str) -> Result<Vec<(String, String, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, config, weight FROM ensemble_rules
             WHERE pattern_name = ?1 AND enabled = 1
             ORDER BY weight DESC, id",
        )?;
        let rows = stmt
            .query_map(params![pattern_name], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fold one scan's outcome into the pattern's usage statistics.
    pub fn record_usage(&self, name: &str, checked: u64, matched: u64) -> Result<()> {
        self.conn.execute(
            "UPDATE patterns SET
                times_checked = times_checked + ?2,
                times_matched = times_matched + ?3,
                last_used = ?4
             WHERE name = ?1",
            params![name, checked, matched, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Natural-language lookup over name/description/rationale.
    pub fn search(&self, query: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM patterns_fts WHERE patterns_fts MATCH ?1 ORDER BY rank")?;
        let names = stmt
            .query_map(params![query], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}
