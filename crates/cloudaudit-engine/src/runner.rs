//! Check runner - bounded-concurrency execution with failure isolation
//!
//! Checks within one scan share no mutable state, so they run concurrently
//! up to a bound. Output order always matches declaration order regardless
//! of completion order, keeping reports reproducible. There are no retries:
//! a transient fault is reported as a finding and the caller may re-run the
//! whole scan.

use cloudaudit_core::{Check, CheckOutcome, Fault, RawResult, ScanContext};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Execute every check against the context, isolating failures
///
/// A fault in one check never aborts the rest: probe errors arrive as
/// `CheckOutcome::Fault` values, and a check that exceeds the per-check
/// timeout is recorded as a connection fault.
pub async fn run_checks(
    ctx: &ScanContext,
    checks: &[Arc<dyn Check>],
    max_concurrent: usize,
) -> Vec<RawResult> {
    debug!(
        target = %ctx.target.display(),
        checks = checks.len(),
        max_concurrent,
        "running check battery"
    );

    stream::iter(checks.iter().cloned())
        .map(|check| {
            let ctx = ctx.clone();
            async move {
                let name = check.name().to_string();
                let outcome =
                    match tokio::time::timeout(ctx.check_timeout, check.run(&ctx)).await {
                        Ok(outcome) => outcome,
                        Err(_) => CheckOutcome::Fault(Fault::Connection(format!(
                            "check timed out after {:?}",
                            ctx.check_timeout
                        ))),
                    };
                if let CheckOutcome::Fault(fault) = &outcome {
                    warn!(check = %name, %fault, "check did not complete");
                }
                RawResult::new(name, outcome)
            }
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}
