//! CloudAudit Mongo - MongoDB target adapter
//!
//! A fixed, ordered registry of checks against a MongoDB deployment,
//! executed through the `AdminProbe` capability. Check output follows the
//! engine's keyword convention ("Error"/"Warning" tokens) and is bucketed by
//! the core classifier; authorization faults degrade to findings instead of
//! aborting the batch.

mod checks;

pub use checks::{
    AuthenticationCheck, BindAddressCheck, DefaultPortCheck, FieldHygieneCheck, LoggingCheck,
    PasswordStrengthCheck, PrivilegedRolesCheck, TransportEncryptionCheck,
};

use cloudaudit_core::Check;
use std::sync::Arc;

/// Stored password values shorter than this are treated as likely unhashed.
/// Matches the hash-length convention used by the JSON script analyzer.
pub const MIN_HASHED_PASSWORD_LEN: usize = 60;

/// The adapter's check battery, in fixed declaration order
///
/// The runner preserves this order in its output so reports stay
/// reproducible across runs.
pub fn checks() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(AuthenticationCheck),
        Arc::new(BindAddressCheck),
        Arc::new(PrivilegedRolesCheck),
        Arc::new(TransportEncryptionCheck),
        Arc::new(DefaultPortCheck),
        Arc::new(LoggingCheck),
        Arc::new(FieldHygieneCheck),
        Arc::new(PasswordStrengthCheck),
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
                "Authentication",
                "Bind Address Exposure",
                "Privileged Role Audit",
                "Transport Encryption",
                "Default Port Usage",
                "Logging",
                "Field Hygiene",
                "Password Hash Strength",
            ]
        );
    }
}
