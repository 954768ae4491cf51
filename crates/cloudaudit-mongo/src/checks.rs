//! MongoDB check implementations

use crate::MIN_HASHED_PASSWORD_LEN;
use async_trait::async_trait;
use cloudaudit_core::{AdminProbe, Check, CheckOutcome, ProbeError, ScanContext};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Databases maintained by the server itself, skipped by data-hygiene scans
const SYSTEM_DATABASES: &[&str] = &["admin", "local", "config"];

/// Roles that grant full control over the deployment regardless of the
/// database they are held on
const ROOT_EQUIVALENT_ROLES: &[&str] = &["root", "userAdminAnyDatabase", "dbAdminAnyDatabase"];

/// Whether a `usersInfo` role entry grants root-equivalent control
///
/// `dbOwner` scoped to the admin database can grant itself any role, so it
/// counts too; on any other database it is an ordinary owner role.
fn is_root_equivalent(role: &Value) -> bool {
    let name = role.get("role").and_then(Value::as_str).unwrap_or("");
    if ROOT_EQUIVALENT_ROLES.contains(&name) {
        return true;
    }
    name == "dbOwner" && role.get("db").and_then(Value::as_str) == Some("admin")
}

/// Cap on documents sampled per collection
const SAMPLE_LIMIT: usize = 100;

fn admin(ctx: &ScanContext) -> Result<Arc<dyn AdminProbe>, CheckOutcome> {
    ctx.admin.clone().ok_or_else(|| {
        CheckOutcome::Fault(cloudaudit_core::Fault::Unexpected(
            "admin probe not configured for this scan".into(),
        ))
    })
}

/// Convert a probe error into an outcome, degrading authorization faults
/// into findings instead of aborting the check
fn degrade(err: ProbeError, action: &str) -> CheckOutcome {
    match err {
        ProbeError::Permission(m) => CheckOutcome::Text(format!(
            "Warning: insufficient privileges to {} ({})",
            action, m
        )),
        other => CheckOutcome::Fault(other.into()),
    }
}

/// Fetch the `parsed` section of `getCmdLineOpts`
async fn cmd_line_opts(ctx: &ScanContext, action: &str) -> Result<Value, CheckOutcome> {
    let probe = admin(ctx)?;
    match probe.run_command("getCmdLineOpts").await {
        Ok(response) => Ok(response.get("parsed").cloned().unwrap_or(Value::Null)),
        Err(err) => Err(degrade(err, action)),
    }
}

/// Flags deployments that accept unauthenticated clients
pub struct AuthenticationCheck;

#[async_trait]
impl Check for AuthenticationCheck {
    fn name(&self) -> &str {
        "Authentication"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let opts = match cmd_line_opts(ctx, "read server startup options").await {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };

        let enabled = opts
            .pointer("/security/authorization")
            .and_then(Value::as_str)
            .map(|v| v == "enabled")
            .unwrap_or(false);

        if enabled {
            CheckOutcome::Text("Authentication is enabled on the deployment".into())
        } else {
            CheckOutcome::Text(
                "Error: Authentication is not enabled; any client can connect with full access"
                    .into(),
            )
        }
    }
}

/// Flags deployments bound to all interfaces
pub struct BindAddressCheck;

#[async_trait]
impl Check for BindAddressCheck {
    fn name(&self) -> &str {
        "Bind Address Exposure"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let opts = match cmd_line_opts(ctx, "read network bind options").await {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };

        let bind_ip = opts
            .pointer("/net/bindIp")
            .and_then(Value::as_str)
            .unwrap_or("");

        if bind_ip.split(',').any(|ip| ip.trim() == "0.0.0.0") {
            CheckOutcome::Text(
                "Error: Deployment is bound to 0.0.0.0 and reachable from any interface".into(),
            )
        } else {
            CheckOutcome::Text("Deployment is not bound to all interfaces".into())
        }
    }
}

/// Flags users holding root-equivalent roles
pub struct PrivilegedRolesCheck;

#[async_trait]
impl Check for PrivilegedRolesCheck {
    fn name(&self) -> &str {
        "Privileged Role Audit"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match admin(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let response = match probe.run_command("usersInfo").await {
            Ok(v) => v,
            Err(err) => return degrade(err, "enumerate user roles"),
        };

        let users = response
            .get("users")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let privileged: Vec<String> = users
            .iter()
            .filter(|user| {
                user.get("roles")
                    .and_then(Value::as_array)
                    .map(|roles| roles.iter().any(is_root_equivalent))
                    .unwrap_or(false)
            })
            .filter_map(|user| user.get("user").and_then(Value::as_str).map(String::from))
            .collect();

        if privileged.is_empty() {
            CheckOutcome::Text("No users hold root-equivalent roles".into())
        } else {
            CheckOutcome::Text(format!(
                "Warning: {} user(s) hold root-equivalent roles: {}",
                privileged.len(),
                privileged.join(", ")
            ))
        }
    }
}

/// Flags deployments that do not require TLS for client connections
pub struct TransportEncryptionCheck;

#[async_trait]
impl Check for TransportEncryptionCheck {
    fn name(&self) -> &str {
        "Transport Encryption"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let opts = match cmd_line_opts(ctx, "read TLS options").await {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };

        // tls.mode superseded ssl.mode; accept either spelling
        let mode = opts
            .pointer("/net/tls/mode")
            .or_else(|| opts.pointer("/net/ssl/mode"))
            .and_then(Value::as_str)
            .unwrap_or("disabled");

        if mode == "requireTLS" || mode == "requireSSL" {
            CheckOutcome::Text("TLS is required for all client connections".into())
        } else {
            CheckOutcome::Text(format!(
                "Error: TLS is not required for client connections (mode: {})",
                mode
            ))
        }
    }
}

/// Flags use of the well-known default port 27017
pub struct DefaultPortCheck;

#[async_trait]
impl Check for DefaultPortCheck {
    fn name(&self) -> &str {
        "Default Port Usage"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let opts = match cmd_line_opts(ctx, "read network port options").await {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };

        // Servers started without an explicit port listen on 27017
        let port = opts
            .pointer("/net/port")
            .and_then(Value::as_u64)
            .unwrap_or(27017);

        if port == 27017 {
            CheckOutcome::Text(
                "Warning: Deployment listens on the default port 27017, an easy scan target"
                    .into(),
            )
        } else {
            CheckOutcome::Text(format!("Deployment listens on non-default port {}", port))
        }
    }
}

/// Flags deployments with no server log destination
pub struct LoggingCheck;

#[async_trait]
impl Check for LoggingCheck {
    fn name(&self) -> &str {
        "Logging"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let opts = match cmd_line_opts(ctx, "read logging options").await {
            Ok(v) => v,
            Err(outcome) => return outcome,
        };

        if opts.pointer("/systemLog/destination").is_some()
            || opts.pointer("/systemLog/path").is_some()
        {
            CheckOutcome::Text("Server logging is configured".into())
        } else {
            CheckOutcome::Text(
                "Warning: No log destination configured; incidents cannot be reconstructed"
                    .into(),
            )
        }
    }
}

/// Flags empty or null field values across user collections
pub struct FieldHygieneCheck;

#[async_trait]
impl Check for FieldHygieneCheck {
    fn name(&self) -> &str {
        "Field Hygiene"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match admin(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let mut empty_fields = 0usize;
        let mut collections_scanned = 0usize;

        let databases = match probe.list_databases().await {
            Ok(dbs) => dbs,
            Err(err) => return degrade(err, "list databases"),
        };

        for db in databases.iter().filter(|db| !SYSTEM_DATABASES.contains(&db.as_str())) {
            let collections = match probe.list_collections(db).await {
                Ok(c) => c,
                Err(err) => return degrade(err, "list collections"),
            };

            for collection in &collections {
                let documents = match probe.find_documents(db, collection, SAMPLE_LIMIT).await {
                    Ok(d) => d,
                    Err(err) => return degrade(err, "sample collection documents"),
                };
                collections_scanned += 1;
                debug!(db, collection, sampled = documents.len(), "scanning fields");

                for document in &documents {
                    if let Some(fields) = document.as_object() {
                        empty_fields += fields
                            .values()
                            .filter(|v| v.is_null() || v.as_str() == Some(""))
                            .count();
                    }
                }
            }
        }

        if empty_fields == 0 {
            CheckOutcome::Text(format!(
                "No empty or null fields found across {} collection(s)",
                collections_scanned
            ))
        } else {
            CheckOutcome::Text(format!(
                "Warning: {} empty or null field value(s) found across {} collection(s)",
                empty_fields, collections_scanned
            ))
        }
    }
}

/// Heuristic for stored passwords that were never hashed
///
/// Modern password hashes (bcrypt, argon2, scrypt) serialize to 60+
/// characters; anything shorter stored under a `password` key is treated as
/// likely plaintext.
pub struct PasswordStrengthCheck;

#[async_trait]
impl Check for PasswordStrengthCheck {
    fn name(&self) -> &str {
        "Password Hash Strength"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match admin(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let databases = match probe.list_databases().await {
            Ok(dbs) => dbs,
            Err(err) => return degrade(err, "list databases"),
        };

        let mut suspect = 0usize;

        for db in databases.iter().filter(|db| !SYSTEM_DATABASES.contains(&db.as_str())) {
            let collections = match probe.list_collections(db).await {
                Ok(c) => c,
                Err(err) => return degrade(err, "list collections"),
            };

            for collection in &collections {
                let documents = match probe.find_documents(db, collection, SAMPLE_LIMIT).await {
                    Ok(d) => d,
                    Err(err) => return degrade(err, "sample collection documents"),
                };

                for document in &documents {
                    if let Some(fields) = document.as_object() {
                        for (key, value) in fields {
                            if key.eq_ignore_ascii_case("password") {
                                if let Some(s) = value.as_str() {
                                    if !s.is_empty() && s.len() < MIN_HASHED_PASSWORD_LEN {
                                        suspect += 1;
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        if suspect == 0 {
            CheckOutcome::Text("Stored passwords look hashed".into())
        } else {
            CheckOutcome::Text(format!(
                "Error: {} stored password(s) appear to be unhashed (shorter than {} characters)",
                suspect, MIN_HASHED_PASSWORD_LEN
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudaudit_core::{classify, Category, Target};
    use serde_json::json;

    /// Scripted probe: responds to admin commands from canned values
    struct FakeProbe {
        cmd_line_opts: Value,
        users_info: Result<Value, ProbeError>,
        documents: Vec<Value>,
    }

    impl Default for FakeProbe {
        fn default() -> Self {
            Self {
                cmd_line_opts: json!({"parsed": {}}),
                users_info: Ok(json!({"users": []})),
                documents: vec![],
            }
        }
    }

    #[async_trait]
    impl AdminProbe for FakeProbe {
        async fn run_command(&self, name: &str) -> Result<Value, ProbeError> {
            match name {
                "getCmdLineOpts" => Ok(self.cmd_line_opts.clone()),
                "usersInfo" => self.users_info.clone(),
                other => Err(ProbeError::Other(format!("unknown command {}", other))),
            }
        }

        async fn list_databases(&self) -> Result<Vec<String>, ProbeError> {
            Ok(vec!["admin".into(), "app".into()])
        }

        async fn list_collections(&self, _db: &str) -> Result<Vec<String>, ProbeError> {
            Ok(vec!["users".into()])
        }

        async fn find_documents(
            &self,
            _db: &str,
            _collection: &str,
            _limit: usize,
        ) -> Result<Vec<Value>, ProbeError> {
            Ok(self.documents.clone())
        }
    }

    fn ctx_with(probe: FakeProbe) -> ScanContext {
        ScanContext::new(Target::mongo("mongodb://db.internal:27017")).with_admin(Arc::new(probe))
    }

    #[tokio::test]
    async fn test_auth_disabled_is_danger() {
        let ctx = ctx_with(FakeProbe::default());
        let outcome = AuthenticationCheck.run(&ctx).await;
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected text outcome");
        };
        assert_eq!(classify(&text), Category::Danger);
    }

    #[tokio::test]
    async fn test_auth_enabled_is_good() {
        let probe = FakeProbe {
            cmd_line_opts: json!({"parsed": {"security": {"authorization": "enabled"}}}),
            ..Default::default()
        };
        let outcome = AuthenticationCheck.run(&ctx_with(probe)).await;
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected text outcome");
        };
        assert_eq!(classify(&text), Category::Good);
    }

    #[tokio::test]
    async fn test_bind_all_interfaces_flagged() {
        let probe = FakeProbe {
            cmd_line_opts: json!({"parsed": {"net": {"bindIp": "127.0.0.1,0.0.0.0"}}}),
            ..Default::default()
        };
        let outcome = BindAddressCheck.run(&ctx_with(probe)).await;
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected text outcome");
        };
        assert!(text.contains("0.0.0.0"));
        assert_eq!(classify(&text), Category::Danger);
    }

    #[tokio::test]
    async fn test_privileged_roles_flagged() {
        let probe = FakeProbe {
            users_info: Ok(json!({"users": [
                {"user": "admin", "roles": [{"role": "root", "db": "admin"}]},
                {"user": "app", "roles": [{"role": "readWrite", "db": "app"}]}
            ]})),
            ..Default::default()
        };
        let outcome = PrivilegedRolesCheck.run(&ctx_with(probe)).await;
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected text outcome");
        };
        assert!(text.contains("1 user(s)"));
        assert!(text.contains("admin"));
        assert_eq!(classify(&text), Category::Warning);
    }

    #[tokio::test]
    async fn test_db_owner_root_equivalent_only_on_admin() {
        let probe = FakeProbe {
            users_info: Ok(json!({"users": [
                {"user": "ops", "roles": [{"role": "dbOwner", "db": "admin"}]},
                {"user": "app", "roles": [{"role": "dbOwner", "db": "app"}]}
            ]})),
            ..Default::default()
        };
        let outcome = PrivilegedRolesCheck.run(&ctx_with(probe)).await;
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected text outcome");
        };
        assert!(text.contains("1 user(s)"));
        assert!(text.contains("ops"));
        assert!(!text.contains("app"));
        assert_eq!(classify(&text), Category::Warning);
    }

    #[tokio::test]
    async fn test_permission_fault_degrades_to_warning() {
        let probe = FakeProbe {
            users_info: Err(ProbeError::Permission("usersInfo requires admin".into())),
            ..Default::default()
        };
        let outcome = PrivilegedRolesCheck.run(&ctx_with(probe)).await;
        // Degraded to a finding, not a fault
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected degraded text outcome");
        };
        assert_eq!(classify(&text), Category::Warning);
        assert!(text.contains("insufficient privileges"));
    }

    #[tokio::test]
    async fn test_connection_fault_propagates_as_fault() {
        let probe = FakeProbe {
            users_info: Err(ProbeError::Connection("reset by peer".into())),
            ..Default::default()
        };
        let outcome = PrivilegedRolesCheck.run(&ctx_with(probe)).await;
        assert!(outcome.is_fault());
    }

    #[tokio::test]
    async fn test_default_port_assumed_when_unset() {
        let ctx = ctx_with(FakeProbe::default());
        let outcome = DefaultPortCheck.run(&ctx).await;
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected text outcome");
        };
        assert!(text.contains("27017"));
        assert_eq!(classify(&text), Category::Warning);
    }

    #[tokio::test]
    async fn test_field_hygiene_counts_empty_values() {
        let probe = FakeProbe {
            documents: vec![
                json!({"name": "a", "bio": "", "age": null}),
                json!({"name": "b", "bio": "ok"}),
            ],
            ..Default::default()
        };
        let outcome = FieldHygieneCheck.run(&ctx_with(probe)).await;
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected text outcome");
        };
        assert!(text.contains("2 empty or null"));
        assert_eq!(classify(&text), Category::Warning);
    }

    #[tokio::test]
    async fn test_short_password_flagged_as_unhashed() {
        let probe = FakeProbe {
            documents: vec![
                json!({"username": "a", "password": "hunter2"}),
                json!({"username": "b", "password": "$2b$12$".to_owned() + &"x".repeat(53)}),
            ],
            ..Default::default()
        };
        let outcome = PasswordStrengthCheck.run(&ctx_with(probe)).await;
        let CheckOutcome::Text(text) = outcome else {
            panic!("expected text outcome");
        };
        assert!(text.contains("1 stored password(s)"));
        assert_eq!(classify(&text), Category::Danger);
    }

    #[tokio::test]
    async fn test_missing_probe_is_fault() {
        let ctx = ScanContext::new(Target::mongo("mongodb://db.internal:27017"));
        let outcome = AuthenticationCheck.run(&ctx).await;
        assert!(outcome.is_fault());
    }
}
