//! SQL script analyzer
//!
//! A pattern battery, not a parser: each statement runs through independent
//! textual rules and every rule may add its own finding. The one exception
//! is mismatched parentheses, which abort the structural rules for that
//! statement since nesting can no longer be trusted.

use cloudaudit_core::AnalysisResult;
use tracing::debug;

/// Keywords a statement is allowed to begin with
const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "TRUNCATE",
];

/// Column type tokens recognized in CREATE TABLE bodies
const TYPE_TOKENS: &[&str] = &[
    "INT", "INTEGER", "BIGINT", "SMALLINT", "SERIAL", "TEXT", "VARCHAR", "CHAR", "BOOLEAN",
    "BOOL", "FLOAT", "DOUBLE", "REAL", "NUMERIC", "DECIMAL", "DATE", "TIME", "TIMESTAMP", "BLOB",
];

/// Validate SQL content into a categorized analysis result
///
/// Terminal errors (JSON content, empty input, no recognized keyword) stop
/// the analysis with a single format error. Otherwise the content is split
/// on `;` and each statement is inspected independently.
pub fn validate_sql(content: &str) -> AnalysisResult {
    if serde_json::from_str::<serde_json::Value>(content).is_ok() {
        return AnalysisResult::format_error(
            "Content is valid JSON, not SQL; submit it to the JSON analyzer",
        );
    }

    let stripped = strip_comment_lines(content);
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return AnalysisResult::format_error("Script is empty");
    }

    let upper = trimmed.to_uppercase();
    if !SQL_KEYWORDS.iter().any(|k| upper.contains(k)) {
        return AnalysisResult::format_error(
            "No recognized SQL keyword found (expected SELECT, INSERT, UPDATE, DELETE, \
             CREATE, ALTER, DROP, or TRUNCATE)",
        );
    }

    let terminated = trimmed.ends_with(';');
    let statements: Vec<&str> = trimmed
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    debug!(statements = statements.len(), "analyzing SQL script");

    let mut result = AnalysisResult::default();
    let count = statements.len();
    for (index, statement) in statements.iter().enumerate() {
        // every statement but the last inherits a terminator from the split
        let has_terminator = terminated || index + 1 < count;
        analyze_statement(statement, has_terminator, &mut result);
    }
    result
}

/// Drop lines that are entirely `--` comments
fn strip_comment_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn snippet(statement: &str) -> &str {
    let end = statement
        .char_indices()
        .nth(40)
        .map(|(i, _)| i)
        .unwrap_or(statement.len());
    &statement[..end]
}

fn analyze_statement(statement: &str, has_terminator: bool, result: &mut AnalysisResult) {
    let upper = statement.to_uppercase();
    let first_word = upper.split_whitespace().next().unwrap_or("");

    if !SQL_KEYWORDS.contains(&first_word) {
        result.error(format!(
            "Statement does not begin with a recognized SQL keyword: \"{}\"",
            snippet(statement)
        ));
    }

    if !has_terminator {
        result.warning(format!(
            "Statement not terminated with ';': \"{}\"",
            snippet(statement)
        ));
    }

    if !parentheses_balanced(statement) {
        result.error(format!(
            "Mismatched parentheses in statement: \"{}\"",
            snippet(statement)
        ));
        return;
    }

    match first_word {
        "SELECT" => analyze_select(statement, &upper, result),
        "INSERT" => analyze_insert(statement, &upper, result),
        "DELETE" | "UPDATE" => {
            if !upper.contains("WHERE") {
                result.error(format!(
                    "{} statement missing a WHERE clause: \"{}\"",
                    first_word,
                    snippet(statement)
                ));
            }
        }
        "CREATE" => analyze_create(&upper, statement, result),
        "DROP" => {
            if upper.starts_with("DROP TABLE") && rest_after(&upper, "DROP TABLE").is_empty() {
                result.error("DROP TABLE missing a table name");
            }
        }
        "ALTER" => analyze_alter(&upper, result),
        _ => {}
    }

    if upper.contains("WHERE") {
        let squeezed: String = statement.chars().filter(|c| !c.is_whitespace()).collect();
        if squeezed.contains("=''") || squeezed.contains("=\"\"") {
            result.warning(format!(
                "Equality comparison against an empty string in WHERE clause: \"{}\"",
                snippet(statement)
            ));
        }
    }

    if upper.contains("JOIN") {
        result.good(format!(
            "Uses an explicit JOIN: \"{}\"",
            snippet(statement)
        ));
    }
}

fn analyze_select(statement: &str, upper: &str, result: &mut AnalysisResult) {
    // index into `upper`, not `statement`: uppercasing can change byte
    // lengths for non-ASCII content
    let columns = match upper.find(" FROM") {
        Some(from_idx) => upper["SELECT".len()..from_idx].trim(),
        None => upper["SELECT".len()..].trim(),
    };

    if columns.is_empty() {
        result.error(format!(
            "SELECT with no column list: \"{}\"",
            snippet(statement)
        ));
    } else if columns != "*" {
        result.good(format!(
            "Explicit column list instead of SELECT *: \"{}\"",
            snippet(statement)
        ));
    }
}

fn analyze_insert(statement: &str, upper: &str, result: &mut AnalysisResult) {
    let Some(values_idx) = upper.find("VALUES") else {
        return;
    };
    let head = &upper[..values_idx];
    let tail = &upper[values_idx..];

    let column_count = parenthesized_item_count(head);
    match column_count {
        None => {
            result.warning(format!(
                "INSERT without an explicit column list: \"{}\"",
                snippet(statement)
            ));
        }
        Some(columns) => {
            if let Some(values) = parenthesized_item_count(tail) {
                if columns != values {
                    result.error(format!(
                        "INSERT column count ({}) does not match value count ({}): \"{}\"",
                        columns,
                        values,
                        snippet(statement)
                    ));
                }
            }
        }
    }
}

fn analyze_create(upper: &str, statement: &str, result: &mut AnalysisResult) {
    if !upper.starts_with("CREATE TABLE") {
        return;
    }
    let has_type = upper
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .any(|token| TYPE_TOKENS.contains(&token));
    if !has_type {
        result.error(format!(
            "CREATE TABLE without a column type: \"{}\"",
            snippet(statement)
        ));
    }
}

fn analyze_alter(upper: &str, result: &mut AnalysisResult) {
    if !upper.starts_with("ALTER TABLE") {
        return;
    }
    if rest_after(upper, "ALTER TABLE").is_empty() {
        result.error("ALTER TABLE missing a table name");
        return;
    }
    if upper.contains("RENAME TO") && rest_after(upper, "RENAME TO").is_empty() {
        result.error("RENAME TO missing the new table name");
    }
}

fn rest_after<'a>(upper: &'a str, prefix: &str) -> &'a str {
    match upper.find(prefix) {
        Some(idx) => upper[idx + prefix.len()..].trim(),
        None => "",
    }
}

fn parentheses_balanced(statement: &str) -> bool {
    let mut depth: i32 = 0;
    for c in statement.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Number of comma-separated items inside the first top-level parenthesis
/// group, or None when the text has no parenthesis group
fn parenthesized_item_count(text: &str) -> Option<usize> {
    let open = text.find('(')?;
    let mut depth = 0;
    let mut items = 1;
    let mut saw_content = false;
    for c in text[open..].chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return if saw_content { Some(items) } else { Some(0) };
                }
            }
            ',' if depth == 1 => items += 1,
            c if !c.is_whitespace() => saw_content = true,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_without_where_is_single_error() {
        let result = validate_sql("DELETE FROM t;");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("WHERE clause"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_mismatched_parentheses_is_single_error() {
        let result = validate_sql("SELECT (1 FROM t;");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Mismatched parentheses"));
    }

    #[test]
    fn test_explicit_select_is_single_good_practice() {
        let result = validate_sql("SELECT id FROM t;");
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.good_practices.len(), 1);
    }

    #[test]
    fn test_select_star_earns_nothing() {
        let result = validate_sql("SELECT * FROM t;");
        assert!(result.errors.is_empty());
        assert!(result.good_practices.is_empty());
    }

    #[test]
    fn test_json_content_short_circuits() {
        let result = validate_sql(r#"{"select": 1}"#);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("JSON"));
        assert!(result.warnings.is_empty());
        assert!(result.good_practices.is_empty());
    }

    #[test]
    fn test_empty_script() {
        let result = validate_sql("   \n  ");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("empty"));
    }

    #[test]
    fn test_comment_only_script_is_empty() {
        let result = validate_sql("-- just a comment\n--another\n");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("empty"));
    }

    #[test]
    fn test_no_recognized_keyword() {
        let result = validate_sql("hello world");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("No recognized SQL keyword"));
    }

    #[test]
    fn test_insert_without_column_list_warns() {
        let result = validate_sql("INSERT INTO t VALUES (1, 2);");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("column list"));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_insert_count_mismatch() {
        let result = validate_sql("INSERT INTO t (a, b, c) VALUES (1, 2);");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("column count (3)"));
        assert!(result.errors[0].contains("value count (2)"));
    }

    #[test]
    fn test_unterminated_statement_warns() {
        let result = validate_sql("SELECT id FROM t");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("not terminated"));
        // still earns the explicit-column good practice
        assert_eq!(result.good_practices.len(), 1);
    }

    #[test]
    fn test_empty_string_equality_in_where() {
        let result = validate_sql("SELECT id FROM t WHERE name = '';");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("empty string"));
    }

    #[test]
    fn test_create_table_without_types() {
        let result = validate_sql("CREATE TABLE t (id, name);");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("column type"));

        let ok = validate_sql("CREATE TABLE t (id INT, name TEXT);");
        assert!(ok.errors.is_empty());
    }

    #[test]
    fn test_drop_and_alter_missing_names() {
        let result = validate_sql("DROP TABLE;");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("DROP TABLE"));

        let result = validate_sql("ALTER TABLE t RENAME TO;");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("RENAME TO"));
    }

    #[test]
    fn test_join_is_good_practice() {
        let result = validate_sql("SELECT a.id FROM a INNER JOIN b ON a.id = b.a_id;");
        assert!(result.errors.is_empty());
        assert_eq!(result.good_practices.len(), 2);
    }

    #[test]
    fn test_findings_accumulate_across_statements() {
        let result = validate_sql("SELECT id FROM t; DELETE FROM t;");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.good_practices.len(), 1);
    }

    #[test]
    fn test_statement_with_unknown_keyword() {
        let result = validate_sql("EXPLAIN SELECT id FROM t;");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("recognized SQL keyword"));
    }
}
