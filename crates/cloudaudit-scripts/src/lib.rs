//! CloudAudit Scripts - SQL and JSON content analyzers
//!
//! Unlike the live-target adapters, analyzers inspect uploaded text and
//! emit an `AnalysisResult` whose three lists map to categories by a fixed
//! rule (errors are Danger, warnings are Warning, good practices are Good).
//! The keyword classifier is never involved.

mod json;
mod sql;

pub use json::validate_json;
pub use sql::validate_sql;

use cloudaudit_core::AnalysisResult;
use serde::{Deserialize, Serialize};

/// The script formats the engine can analyze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    Sql,
    Json,
}

impl ScriptKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sql" => Some(ScriptKind::Sql),
            "json" => Some(ScriptKind::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptKind::Sql => "sql",
            ScriptKind::Json => "json",
        }
    }
}

impl std::fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch to the analyzer for the given kind
///
/// Pure with respect to engine state: identical content always yields an
/// identical result.
pub fn validate_script(kind: ScriptKind, content: &str) -> AnalysisResult {
    match kind {
        ScriptKind::Sql => validate_sql(content),
        ScriptKind::Json => validate_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(ScriptKind::parse("sql"), Some(ScriptKind::Sql));
        assert_eq!(ScriptKind::parse(" JSON "), Some(ScriptKind::Json));
        assert_eq!(ScriptKind::parse("yaml"), None);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let sql = "SELECT id, name FROM users WHERE active = 1;";
        let first = validate_script(ScriptKind::Sql, sql);
        let second = validate_script(ScriptKind::Sql, sql);
        assert_eq!(first, second);

        let json = r#"{"username": "a", "password": "short", "email": "a@b.com"}"#;
        let first = validate_script(ScriptKind::Json, json);
        let second = validate_script(ScriptKind::Json, json);
        assert_eq!(first, second);
    }
}
