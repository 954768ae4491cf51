//! CloudAudit Hosting - Firebase Hosting target adapter
//!
//! Probes a hosted site over HTTP through the `HttpProbe` capability.
//! Domain-suffix validation gates the whole battery: an unrecognized domain
//! is a validation failure and no checks run.
//!
//! Hosting messages follow the `Could not / Missing / Low` convention and
//! carry their category directly via `classify_hosting`, a stricter
//! adapter-local rule than the core keyword shim. It stays local because
//! these messages are generated here and the probes are HTTP-status driven
//! rather than keyword-driven.

mod checks;
mod client;

pub use checks::{
    CacheControlCheck, HttpsRedirectCheck, LegacyHeadersCheck, PerformanceCheck,
    RateLimitHeadersCheck, RedirectLoopCheck, SecurityHeadersCheck,
};
pub use client::ReqwestProbe;

use cloudaudit_core::{Category, Check};
use std::sync::Arc;

/// Domain suffixes recognized as Firebase Hosting
pub const HOSTING_SUFFIXES: &[&str] = &[".web.app", ".firebaseapp.com"];

/// Whether a domain is a recognized hosting domain
///
/// Gates all further checks: scanning an unrecognized domain is a
/// validation failure, not a finding battery.
pub fn validate_domain(domain: &str) -> bool {
    let domain = domain.trim().trim_end_matches('/');
    !domain.contains('/')
        && HOSTING_SUFFIXES.iter().any(|suffix| {
            domain.len() > suffix.len() && domain.ends_with(suffix)
        })
}

/// Adapter-local classification of hosting check messages
///
/// `Could not` marks a probe that failed outright; `Missing`/`Low` mark a
/// reachable site with a weak configuration.
pub fn classify_hosting(message: &str) -> Category {
    if message.contains("Could not") {
        Category::Danger
    } else if message.contains("Missing") || message.contains("Low") {
        Category::Warning
    } else {
        Category::Good
    }
}

/// The adapter's check battery, in fixed declaration order
pub fn checks() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(HttpsRedirectCheck),
        Arc::new(SecurityHeadersCheck),
        Arc::new(CacheControlCheck),
        Arc::new(PerformanceCheck),
        Arc::new(RedirectLoopCheck),
        Arc::new(LegacyHeadersCheck),
        Arc::new(RateLimitHeadersCheck),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_suffixes() {
        assert!(validate_domain("site.web.app"));
        assert!(validate_domain("my-project.firebaseapp.com"));
    }

    #[test]
    fn test_unrecognized_domains_rejected() {
        assert!(!validate_domain("site.example.com"));
        assert!(!validate_domain("web.app"));
        assert!(!validate_domain("site.web.app/path"));
        assert!(!validate_domain(""));
    }

    #[test]
    fn test_hosting_classification_rule() {
        assert_eq!(
            classify_hosting("Could not reach http://site.web.app"),
            Category::Danger
        );
        assert_eq!(
            classify_hosting("Missing Strict-Transport-Security header"),
            Category::Warning
        );
        assert_eq!(
            classify_hosting("Low performance score: 55/100"),
            Category::Warning
        );
        assert_eq!(
            classify_hosting("All required security headers present"),
            Category::Good
        );
    }

    #[test]
    fn test_check_order_is_fixed() {
        let names: Vec<String> = checks().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "HTTPS Redirect",
                "Security Headers",
                "Cache Control",
                "Performance",
                "Redirect Loops",
                "Legacy Security Headers",
                "API Rate Limiting",
            ]
        );
    }
}
