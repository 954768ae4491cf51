//! Keyword classifier - the compatibility shim for free-text check results
//!
//! Checks that predate structured outcomes phrase their result text by a
//! token convention, and this shim buckets them on substring matches. The
//! contract is brittle by design and documented as lossy: a message like
//! "Error count: 0" classifies as Danger because it contains the token.
//! New checks return `CheckOutcome::Classified` and never reach this path.

use crate::category::Category;
use crate::check::{CheckOutcome, RawResult};
use crate::finding::Finding;

/// Classify free result text by token convention
///
/// Pure and deterministic: priority order is "Error" then "Warning", with
/// everything else Good.
pub fn classify(text: &str) -> Category {
    if text.contains("Error") {
        Category::Danger
    } else if text.contains("Warning") {
        Category::Warning
    } else {
        Category::Good
    }
}

impl Finding {
    /// Convert a raw runner result into a classified finding
    ///
    /// Structured outcomes keep their category, text goes through the
    /// keyword shim, and faults are always Danger regardless of text.
    pub fn from_raw(raw: RawResult) -> Finding {
        match raw.outcome {
            CheckOutcome::Classified(category, message) => {
                Finding::new(raw.check_name, category, message)
            }
            CheckOutcome::Text(text) => {
                let category = classify(&text);
                Finding::new(raw.check_name, category, text)
            }
            CheckOutcome::Fault(fault) => {
                Finding::danger(raw.check_name, fault.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Fault;

    #[test]
    fn test_classify_priority_order() {
        assert_eq!(classify("Error: auth disabled"), Category::Danger);
        assert_eq!(classify("Warning: default port"), Category::Warning);
        assert_eq!(classify("TLS enabled"), Category::Good);
        // "Error" wins over "Warning" when both appear
        assert_eq!(classify("Warning escalated to Error"), Category::Danger);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let text = "Warning: 3 users hold elevated roles";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn test_inherited_token_ambiguity() {
        // Documented quirk: the token match fires even when the message
        // reports zero problems. Must not be silently "fixed".
        assert_eq!(classify("Error count: 0"), Category::Danger);
    }

    #[test]
    fn test_fault_is_always_danger() {
        let raw = RawResult::new(
            "Authentication",
            CheckOutcome::Fault(Fault::Connection("no route to host".into())),
        );
        let finding = Finding::from_raw(raw);
        assert_eq!(finding.category, Category::Danger);
        assert!(finding.message.contains("Connection failure"));
    }

    #[test]
    fn test_classified_outcome_bypasses_shim() {
        // A structured Warning stays a Warning even though its message
        // contains the "Error" token.
        let raw = RawResult::new(
            "Log Review",
            CheckOutcome::Classified(Category::Warning, "Error log volume is high".into()),
        );
        let finding = Finding::from_raw(raw);
        assert_eq!(finding.category, Category::Warning);
    }
}
