//! Firebase Hosting check implementations
//!
//! Every check issues its own requests and captures its own failures; one
//! unreachable endpoint never silences the rest of the battery.

use crate::classify_hosting;
use async_trait::async_trait;
use cloudaudit_core::{Check, CheckOutcome, HttpProbe, ScanContext, Target};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Headers every hosted site is expected to send
const REQUIRED_SECURITY_HEADERS: &[&str] = &[
    "Strict-Transport-Security",
    "X-Content-Type-Options",
    "X-Frame-Options",
    "Content-Security-Policy",
];

/// Older headers still worth carrying for defense in depth
const LEGACY_SECURITY_HEADERS: &[&str] = &["X-XSS-Protection", "Referrer-Policy"];

/// Any of these marks the API path as rate limited
const RATE_LIMIT_HEADERS: &[&str] = &["X-RateLimit-Limit", "RateLimit-Limit", "Retry-After"];

const MAX_REDIRECT_HOPS: usize = 10;

fn domain(ctx: &ScanContext) -> Result<&str, CheckOutcome> {
    match &ctx.target {
        Target::HostingDomain(domain) => Ok(domain),
        other => Err(CheckOutcome::Fault(cloudaudit_core::Fault::Unexpected(
            format!("hosting check handed a non-hosting target: {}", other),
        ))),
    }
}

fn http(ctx: &ScanContext) -> Result<Arc<dyn HttpProbe>, CheckOutcome> {
    ctx.http.clone().ok_or_else(|| {
        CheckOutcome::Fault(cloudaudit_core::Fault::Unexpected(
            "HTTP probe not configured for this scan".into(),
        ))
    })
}

/// Wrap a hosting message with its adapter-local classification
fn hosting_outcome(message: String) -> CheckOutcome {
    CheckOutcome::Classified(classify_hosting(&message), message)
}

/// Plain-HTTP requests must be answered with a 301 to HTTPS
pub struct HttpsRedirectCheck;

#[async_trait]
impl Check for HttpsRedirectCheck {
    fn name(&self) -> &str {
        "HTTPS Redirect"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let domain = match domain(ctx) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };
        let probe = match http(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let url = format!("http://{}/", domain);
        let response = match probe.get(&url).await {
            Ok(r) => r,
            Err(e) => return hosting_outcome(format!("Could not reach {}: {}", url, e)),
        };

        let https_location = response
            .location()
            .map(|l| l.starts_with("https://"))
            .unwrap_or(false);

        if response.status == 301 && https_location {
            hosting_outcome("Plain-HTTP requests are redirected to HTTPS with 301".into())
        } else {
            hosting_outcome(format!(
                "Missing HTTPS redirect: plain-HTTP request returned {} instead of a 301 to HTTPS",
                response.status
            ))
        }
    }
}

/// Required security headers on the landing page
pub struct SecurityHeadersCheck;

#[async_trait]
impl Check for SecurityHeadersCheck {
    fn name(&self) -> &str {
        "Security Headers"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let domain = match domain(ctx) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };
        let probe = match http(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let url = format!("https://{}/", domain);
        let response = match probe.get(&url).await {
            Ok(r) => r,
            Err(e) => return hosting_outcome(format!("Could not reach {}: {}", url, e)),
        };

        let missing: Vec<&str> = REQUIRED_SECURITY_HEADERS
            .iter()
            .filter(|h| response.header(h).is_none())
            .copied()
            .collect();

        if missing.is_empty() {
            hosting_outcome("All required security headers are present".into())
        } else {
            hosting_outcome(format!(
                "Missing security header(s): {}",
                missing.join(", ")
            ))
        }
    }
}

/// Cache-Control presence on the landing page
pub struct CacheControlCheck;

#[async_trait]
impl Check for CacheControlCheck {
    fn name(&self) -> &str {
        "Cache Control"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let domain = match domain(ctx) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };
        let probe = match http(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let url = format!("https://{}/", domain);
        let response = match probe.get(&url).await {
            Ok(r) => r,
            Err(e) => return hosting_outcome(format!("Could not reach {}: {}", url, e)),
        };

        if response.header("Cache-Control").is_some() {
            hosting_outcome("Cache-Control header is set on the landing page".into())
        } else {
            hosting_outcome("Missing Cache-Control header on the landing page".into())
        }
    }
}

/// Placeholder performance score derived from landing-page payload size
///
/// Stands in for a real performance audit; the score is a static estimate,
/// not a measured metric.
pub struct PerformanceCheck;

#[async_trait]
impl Check for PerformanceCheck {
    fn name(&self) -> &str {
        "Performance"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let domain = match domain(ctx) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };
        let probe = match http(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let url = format!("https://{}/", domain);
        let response = match probe.get(&url).await {
            Ok(r) => r,
            Err(e) => return hosting_outcome(format!("Could not reach {}: {}", url, e)),
        };

        let payload_kib = response.body.len() / 1024;
        let score = 100usize.saturating_sub(payload_kib / 10).max(5);
        debug!(domain, payload_kib, score, "estimated performance");

        if score < 70 {
            hosting_outcome(format!(
                "Low performance score: {}/100 (landing page payload {} KiB)",
                score, payload_kib
            ))
        } else {
            hosting_outcome(format!("Performance score: {}/100 (static estimate)", score))
        }
    }
}

/// Follows the redirect chain and flags loops or unbounded chains
pub struct RedirectLoopCheck;

#[async_trait]
impl Check for RedirectLoopCheck {
    fn name(&self) -> &str {
        "Redirect Loops"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let domain = match domain(ctx) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };
        let probe = match http(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let mut current = format!("http://{}/", domain);
        let mut visited = HashSet::new();
        visited.insert(current.clone());

        for hop in 0..MAX_REDIRECT_HOPS {
            let response = match probe.get(&current).await {
                Ok(r) => r,
                Err(e) => {
                    return hosting_outcome(format!("Could not reach {}: {}", current, e))
                }
            };

            if !response.is_redirect() {
                return hosting_outcome(format!(
                    "Redirect chain terminates cleanly after {} hop(s)",
                    hop
                ));
            }

            let Some(location) = response.location() else {
                return hosting_outcome(format!(
                    "Could not follow redirect from {}: no Location header",
                    current
                ));
            };

            // Resolve relative Location values against the current URL
            let next = match Url::parse(&current).and_then(|base| base.join(location)) {
                Ok(u) => u.to_string(),
                Err(e) => {
                    return hosting_outcome(format!(
                        "Could not follow redirect from {}: bad Location ({})",
                        current, e
                    ))
                }
            };

            if !visited.insert(next.clone()) {
                return hosting_outcome(format!(
                    "Could not complete redirect chain: loop detected at {}",
                    next
                ));
            }
            current = next;
        }

        hosting_outcome(format!(
            "Could not complete redirect chain: more than {} redirects",
            MAX_REDIRECT_HOPS
        ))
    }
}

/// Legacy defense-in-depth headers (duplicate of the modern header set)
pub struct LegacyHeadersCheck;

#[async_trait]
impl Check for LegacyHeadersCheck {
    fn name(&self) -> &str {
        "Legacy Security Headers"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let domain = match domain(ctx) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };
        let probe = match http(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let url = format!("https://{}/", domain);
        let response = match probe.get(&url).await {
            Ok(r) => r,
            Err(e) => return hosting_outcome(format!("Could not reach {}: {}", url, e)),
        };

        let missing: Vec<&str> = LEGACY_SECURITY_HEADERS
            .iter()
            .filter(|h| response.header(h).is_none())
            .copied()
            .collect();

        if missing.is_empty() {
            hosting_outcome("Legacy security headers are present".into())
        } else {
            hosting_outcome(format!(
                "Missing legacy security header(s): {}",
                missing.join(", ")
            ))
        }
    }
}

/// Rate-limit headers on the API path
pub struct RateLimitHeadersCheck;

#[async_trait]
impl Check for RateLimitHeadersCheck {
    fn name(&self) -> &str {
        "API Rate Limiting"
    }

    async fn run(&self, ctx: &ScanContext) -> CheckOutcome {
        let domain = match domain(ctx) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };
        let probe = match http(ctx) {
            Ok(p) => p,
            Err(outcome) => return outcome,
        };

        let url = format!("https://{}/api", domain);
        let response = match probe.get(&url).await {
            Ok(r) => r,
            Err(e) => return hosting_outcome(format!("Could not reach {}: {}", url, e)),
        };

        let limited = RATE_LIMIT_HEADERS
            .iter()
            .any(|h| response.header(h).is_some());

        if limited {
            hosting_outcome("Rate-limit headers are present on the API path".into())
        } else {
            hosting_outcome("Missing rate-limit headers on the API path".into())
        }
    }
}
