//! JSON document analyzer
//!
//! Validates an uploaded user-record document against a fixed shape:
//! required credential fields, hashed-password heuristic, profile and
//! privacy-settings structure, and per-transaction consistency. Rules fire
//! only when their subject is present; an absent optional object earns
//! neither praise nor a warning.

use cloudaudit_core::AnalysisResult;
use serde_json::Value;
use tracing::debug;

const REQUIRED_FIELDS: &[&str] = &["username", "password", "email"];

/// Password strings at least this long are assumed to be hash output
const HASHED_PASSWORD_LEN: usize = 60;

const ACCOUNT_STATUSES: &[&str] = &["active", "inactive", "suspended"];
const TRANSACTION_STATUSES: &[&str] = &["completed", "pending", "failed"];

/// Validate JSON content into a categorized analysis result
pub fn validate_json(content: &str) -> AnalysisResult {
    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => return AnalysisResult::format_error(format!("Invalid JSON format: {}", e)),
    };
    let Some(root) = value.as_object() else {
        return AnalysisResult::format_error("Top-level JSON value must be an object");
    };
    debug!(fields = root.len(), "analyzing JSON document");

    let mut result = AnalysisResult::default();

    for field in REQUIRED_FIELDS {
        if !root.contains_key(*field) {
            result.error(format!("Missing required field: {}", field));
        }
    }

    if let Some(password) = root.get("password").and_then(Value::as_str) {
        if password.len() >= HASHED_PASSWORD_LEN {
            result.good("Password appears to be hashed (60+ characters)");
        } else {
            result.warning("Password appears to be stored in plaintext");
        }
    }

    if let Some(email) = root.get("email").and_then(Value::as_str) {
        if email.contains('@') {
            result.good("Email address is well-formed");
        } else {
            result.warning("Email address is missing an '@'");
        }
    }

    if let Some(profile) = value.pointer("/user/profile") {
        result.good("User profile object is present");
        if profile.get("preferences").is_some() {
            result.good("User profile preferences are present");
        }
    }

    if let Some(status) = value.pointer("/account/status").and_then(Value::as_str) {
        if ACCOUNT_STATUSES.contains(&status) {
            result.good(format!("Account status is a recognized value: {}", status));
        } else {
            result.warning(format!("Unrecognized account status: {}", status));
        }
    }

    if let Some(transactions) = root.get("transactions").and_then(Value::as_array) {
        for (index, transaction) in transactions.iter().enumerate() {
            check_transaction(index, transaction, &mut result);
        }
    }

    if let Some(privacy) = value.pointer("/settings/privacy") {
        result.good("Privacy settings are present");
        let consent = privacy
            .pointer("/dataSharing/consentGiven")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if consent {
            result.good("Data-sharing consent is recorded");
        } else {
            result.warning("Data-sharing consent is absent or not given");
        }
    }

    result
}

fn check_transaction(index: usize, transaction: &Value, result: &mut AnalysisResult) {
    match transaction.get("status").and_then(Value::as_str) {
        None => result.error(format!("Transaction {} is missing a status field", index)),
        Some(status) if !TRANSACTION_STATUSES.contains(&status) => {
            result.warning(format!(
                "Transaction {} has an unrecognized status: {}",
                index, status
            ));
        }
        Some(_) => {}
    }

    match transaction.get("currency").and_then(Value::as_str) {
        Some("USD") => {}
        Some(currency) => result.warning(format!(
            "Transaction {} uses a non-USD currency: {}",
            index, currency
        )),
        None => result.warning(format!("Transaction {} is missing a currency", index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_three_errors() {
        let result = validate_json("{}");
        assert_eq!(result.errors.len(), 3);
        assert!(result.warnings.is_empty());
        assert!(result.good_practices.is_empty());
        for field in ["username", "password", "email"] {
            assert!(result.errors.iter().any(|e| e.contains(field)));
        }
    }

    #[test]
    fn test_complete_credentials() {
        let password = "x".repeat(65);
        let content = format!(
            r#"{{"username": "a", "password": "{}", "email": "a@b.com"}}"#,
            password
        );
        let result = validate_json(&content);
        assert!(result.errors.is_empty());
        assert!(result
            .good_practices
            .iter()
            .any(|g| g.contains("hashed")));
        assert!(result
            .good_practices
            .iter()
            .any(|g| g.contains("Email")));
    }

    #[test]
    fn test_short_password_warns() {
        let result =
            validate_json(r#"{"username": "a", "password": "hunter2", "email": "a@b.com"}"#);
        assert!(result.warnings.iter().any(|w| w.contains("plaintext")));
    }

    #[test]
    fn test_malformed_email_warns() {
        let result =
            validate_json(r#"{"username": "a", "password": "p", "email": "not-an-email"}"#);
        assert!(result.warnings.iter().any(|w| w.contains('@')));
    }

    #[test]
    fn test_invalid_json_is_terminal() {
        let result = validate_json("{not json");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Invalid JSON format"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_non_object_root_is_terminal() {
        let result = validate_json("[1, 2, 3]");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("object"));
    }

    #[test]
    fn test_profile_and_preferences() {
        let result = validate_json(
            r#"{"username": "a", "password": "p", "email": "a@b.com",
                "user": {"profile": {"preferences": {"theme": "dark"}}}}"#,
        );
        assert!(result
            .good_practices
            .iter()
            .any(|g| g.contains("profile object")));
        assert!(result
            .good_practices
            .iter()
            .any(|g| g.contains("preferences")));
    }

    #[test]
    fn test_account_status_values() {
        let good = validate_json(
            r#"{"username":"a","password":"p","email":"a@b.com","account":{"status":"active"}}"#,
        );
        assert!(good
            .good_practices
            .iter()
            .any(|g| g.contains("Account status")));

        let bad = validate_json(
            r#"{"username":"a","password":"p","email":"a@b.com","account":{"status":"frozen"}}"#,
        );
        assert!(bad
            .warnings
            .iter()
            .any(|w| w.contains("Unrecognized account status")));
    }

    #[test]
    fn test_transaction_rules() {
        let result = validate_json(
            r#"{"username":"a","password":"p","email":"a@b.com",
                "transactions": [
                    {"status": "completed", "currency": "USD"},
                    {"currency": "EUR"},
                    {"status": "unknown"}
                ]}"#,
        );
        // entry 1 has no status
        assert_eq!(
            result
                .errors
                .iter()
                .filter(|e| e.contains("missing a status"))
                .count(),
            1
        );
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("non-USD currency: EUR")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("unrecognized status: unknown")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("missing a currency")));
    }

    #[test]
    fn test_privacy_consent() {
        let given = validate_json(
            r#"{"username":"a","password":"p","email":"a@b.com",
                "settings": {"privacy": {"dataSharing": {"consentGiven": true}}}}"#,
        );
        assert!(given
            .good_practices
            .iter()
            .any(|g| g.contains("consent")));

        let withheld = validate_json(
            r#"{"username":"a","password":"p","email":"a@b.com",
                "settings": {"privacy": {}}}"#,
        );
        assert!(withheld
            .warnings
            .iter()
            .any(|w| w.contains("consent")));
    }
}
