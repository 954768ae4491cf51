//! Firestore check implementations

use crate::{LARGE_DOCUMENT_BYTES, SENSITIVE_FIELD_NAMES};
use async_trait::async_trait;
use cloudaudit_core::{Check, CheckOutcome, DocumentProbe, ProbeError, ScanContext};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

fn documents_probe(ctx: &ScanContext) -> Result<Arc<dyn DocumentProbe>, CheckOutcome> {
    ctx.documents.clone().ok_or_else(|| {
        CheckOutcome::Fault(cloudaudit_core::Fault::Unexpected(
            "document probe not configured for this scan".into(),
        ))
    })
}

fn degrade(err: ProbeError, action: &str) -> CheckOutcome {
    match err {
        ProbeError::Permission(m) => CheckOutcome::Text(format!(
            "Warning: insufficient privileges to {} ({})",
            action, m
        )),
        other => CheckOutcome::Fault(other.into()),
    }
}

/// Presence and completeness of published security rules
pub struct SecurityRulesCheck;

#[async_trait]
impl Check for SecurityRulesCheck {
    fn name(&self) -> &str {
        "Security Rules"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match documents_probe(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let rules = match probe.security_rules().await {
            Ok(r) => r,
            Err(err) => return degrade(err, "fetch security rules"),
        };

        match rules {
            None => CheckOutcome::Text(
                "Error: No security rules are published; the database relies on defaults".into(),
            ),
            Some(source) => {
                if source.contains("if true") {
                    CheckOutcome::Text(
                        "Error: Security rules contain an unconditional allow (if true)".into(),
                    )
                } else if !source.contains("request.auth") {
                    CheckOutcome::Text(
                        "Warning: Security rules never reference request.auth; access is not tied to identity"
                            .into(),
                    )
                } else {
                    CheckOutcome::Text("Security rules are published and reference caller identity".into())
                }
            }
        }
    }
}

/// Attempts an unauthenticated read against every collection
pub struct OpenAccessCheck;

#[async_trait]
impl Check for OpenAccessCheck {
    fn name(&self) -> &str {
        "Open Collection Access"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match documents_probe(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let collections = match probe.list_collections().await {
            Ok(c) => c,
            Err(err) => return degrade(err, "list collections"),
        };

        let mut open = Vec::new();
        for collection in &collections {
            match probe.unrestricted_read(collection).await {
                // A successful unrestricted read is the finding
                Ok(true) => open.push(collection.clone()),
                Ok(false) => {}
                // A rejected read is the desired outcome, not a fault
                Err(ProbeError::Permission(_)) => {}
                Err(err) => return degrade(err, "probe unrestricted reads"),
            }
        }

        if open.is_empty() {
            CheckOutcome::Text(format!(
                "All {} collection(s) reject unauthenticated reads",
                collections.len()
            ))
        } else {
            CheckOutcome::Text(format!(
                "Error: {} collection(s) readable without authentication: {}",
                open.len(),
                open.join(", ")
            ))
        }
    }
}

/// Flags documents whose serialized size exceeds 1 MiB
pub struct LargeDocumentCheck;

#[async_trait]
impl Check for LargeDocumentCheck {
    fn name(&self) -> &str {
        "Large Documents"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match documents_probe(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let collections = match probe.list_collections().await {
            Ok(c) => c,
            Err(err) => return degrade(err, "list collections"),
        };

        let mut oversized = 0usize;
        for collection in &collections {
            let documents = match probe.documents(collection).await {
                Ok(d) => d,
                Err(err) => return degrade(err, "read collection documents"),
            };
            for document in &documents {
                let size = serde_json::to_string(document).map(|s| s.len()).unwrap_or(0);
                if size > LARGE_DOCUMENT_BYTES {
                    debug!(collection, size, "oversized document");
                    oversized += 1;
                }
            }
        }

        if oversized == 0 {
            CheckOutcome::Text("No documents exceed 1 MiB serialized size".into())
        } else {
            CheckOutcome::Text(format!(
                "Warning: {} document(s) exceed 1 MiB serialized size and may hit store limits",
                oversized
            ))
        }
    }
}

/// Flags sensitive field names stored as non-empty plaintext strings
pub struct SensitiveFieldsCheck;

#[async_trait]
impl Check for SensitiveFieldsCheck {
    fn name(&self) -> &str {
        "Plaintext Sensitive Fields"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match documents_probe(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let collections = match probe.list_collections().await {
            Ok(c) => c,
            Err(err) => return degrade(err, "list collections"),
        };

        let mut exposed = Vec::new();
        for collection in &collections {
            let documents = match probe.documents(collection).await {
                Ok(d) => d,
                Err(err) => return degrade(err, "read collection documents"),
            };
            for document in &documents {
                if let Some(fields) = document.as_object() {
                    for (key, value) in fields {
                        let sensitive = SENSITIVE_FIELD_NAMES
                            .iter()
                            .any(|name| key.eq_ignore_ascii_case(name));
                        let plaintext = value.as_str().map(|s| !s.is_empty()).unwrap_or(false);
                        if sensitive && plaintext {
                            let label = format!("{}.{}", collection, key);
                            if !exposed.contains(&label) {
                                exposed.push(label);
                            }
                        }
                    }
                }
            }
        }

        if exposed.is_empty() {
            CheckOutcome::Text("No sensitive fields stored as plaintext strings".into())
        } else {
            CheckOutcome::Text(format!(
                "Error: Sensitive field(s) stored as plaintext strings: {}",
                exposed.join(", ")
            ))
        }
    }
}

/// Flags empty or null field values across collections
pub struct EmptyFieldsCheck;

#[async_trait]
impl Check for EmptyFieldsCheck {
    fn name(&self) -> &str {
        "Empty Fields"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match documents_probe(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let collections = match probe.list_collections().await {
            Ok(c) => c,
            Err(err) => return degrade(err, "list collections"),
        };

        let mut empty = 0usize;
        for collection in &collections {
            let documents = match probe.documents(collection).await {
                Ok(d) => d,
                Err(err) => return degrade(err, "read collection documents"),
            };
            for document in &documents {
                if let Some(fields) = document.as_object() {
                    empty += fields
                        .values()
                        .filter(|v| v.is_null() || v.as_str() == Some(""))
                        .count();
                }
            }
        }

        if empty == 0 {
            CheckOutcome::Text("No empty or null field values found".into())
        } else {
            CheckOutcome::Text(format!(
                "Warning: {} empty or null field value(s) found across {} collection(s)",
                empty,
                collections.len()
            ))
        }
    }
}

/// Issues a synthetic two-field range query per collection and inspects for
/// an index-required rejection
pub struct CompositeIndexCheck;

#[async_trait]
impl Check for CompositeIndexCheck {
    fn name(&self) -> &str {
        "Composite Indexes"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match documents_probe(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let collections = match probe.list_collections().await {
            Ok(c) => c,
            Err(err) => return degrade(err, "list collections"),
        };

        let mut unindexed = Vec::new();
        for collection in &collections {
            match probe
                .range_query(collection, "created_at", "updated_at")
                .await
            {
                Ok(()) => {}
                Err(ProbeError::IndexRequired(_)) => unindexed.push(collection.clone()),
                Err(err) => return degrade(err, "issue range queries"),
            }
        }

        if unindexed.is_empty() {
            CheckOutcome::Text("Multi-field range queries are covered by indexes".into())
        } else {
            CheckOutcome::Text(format!(
                "Warning: {} collection(s) lack a composite index for multi-field range queries: {}",
                unindexed.len(),
                unindexed.join(", ")
            ))
        }
    }
}

/// Flags fields whose value is identical in every document of a collection
pub struct RedundancyCheck;

#[async_trait]
impl Check for RedundancyCheck {
    fn name(&self) -> &str {
        "Data Redundancy"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let probe = match documents_probe(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let collections = match probe.list_collections().await {
            Ok(c) => c,
            Err(err) => return degrade(err, "list collections"),
        };

        let mut redundant = Vec::new();
        for collection in &collections {
            let documents = match probe.documents(collection).await {
                Ok(d) => d,
                Err(err) => return degrade(err, "read collection documents"),
            };
            // Needs at least two documents for "identical everywhere" to mean anything
            if documents.len() < 2 {
                continue;
            }

            let mut field_values: HashMap<String, Vec<&Value>> = HashMap::new();
            for document in &documents {
                if let Some(fields) = document.as_object() {
                    for (key, value) in fields {
                        field_values.entry(key.clone()).or_default().push(value);
                    }
                }
            }

            let mut fields: Vec<&String> = field_values
                .iter()
                .filter(|(_, values)| {
                    values.len() == documents.len()
                        && values.windows(2).all(|pair| pair[0] == pair[1])
                })
                .map(|(key, _)| key)
                .collect();
            fields.sort();
            for field in fields {
                redundant.push(format!("{}.{}", collection, field));
            }
        }

        if redundant.is_empty() {
            CheckOutcome::Text("No fields duplicate the same value across a whole collection".into())
        } else {
            CheckOutcome::Text(format!(
                "Warning: Field(s) hold an identical value in every document: {}",
                redundant.join(", ")
            ))
        }
    }
}
