//! CloudAudit Firestore - Firestore target adapter
//!
//! Checks run through the `DocumentProbe` capability against a project's
//! collections and published security rules. Output follows the engine's
//! keyword convention and is bucketed by the core classifier.

mod checks;

pub use checks::{
    CompositeIndexCheck, EmptyFieldsCheck, LargeDocumentCheck, OpenAccessCheck, RedundancyCheck,
    SecurityRulesCheck, SensitiveFieldsCheck,
};

use cloudaudit_core::Check;
use std::sync::Arc;

/// Serialized document size above which a document is flagged (1 MiB)
pub const LARGE_DOCUMENT_BYTES: usize = 1 << 20;

/// Field names treated as sensitive when stored as non-empty plaintext strings
pub const SENSITIVE_FIELD_NAMES: &[&str] = &[
    "password",
    "api_key",
    "apiKey",
    "private_key",
    "privateKey",
    "secret",
    "token",
];

/// The adapter's check battery, in fixed declaration order
pub fn checks() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(SecurityRulesCheck),
        Arc::new(OpenAccessCheck),
        Arc::new(LargeDocumentCheck),
        Arc::new(SensitiveFieldsCheck),
        Arc::new(EmptyFieldsCheck),
        Arc::new(CompositeIndexCheck),
        Arc::new(RedundancyCheck),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_order_is_fixed() {
        let names: Vec<String> = checks().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "Security Rules",
                "Open Collection Access",
                "Large Documents",
                "Plaintext Sensitive Fields",
                "Empty Fields",
                "Composite Indexes",
                "Data Redundancy",
            ]
        );
    }
}
