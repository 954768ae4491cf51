//! CloudAudit Engine - scan orchestration, persistence, and analytics
//!
//! Ties the adapters together: selects the check battery for a target,
//! runs it through the isolating runner, classifies raw results into
//! findings, and records the report. Script content goes through the
//! analyzers instead of the runner but lands in the same report log.

mod analytics;
mod runner;
mod store;

pub use analytics::{most_scanned, rollup};
pub use runner::run_checks;
pub use store::{JsonFileStore, MemoryStore, ReportFilter, ReportStore};

pub use cloudaudit_scripts::{validate_script, ScriptKind};

use cloudaudit_core::{
    AnalysisResult, AnalyticsSummary, Error, Finding, FindingSet, Result, ScanContext, ScanReport,
    Target, TargetKind,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of a completed scan
///
/// The report is always present: findings are returned to the caller even
/// when the store rejected the insert. `report_id` is set only on a
/// successful insert, and `store_error` carries the persistence failure
/// when there was one.
#[derive(Debug)]
pub struct ScanOutcome {
    pub report: ScanReport,
    pub report_id: Option<Uuid>,
    pub store_error: Option<Error>,
}

impl ScanOutcome {
    pub fn is_stored(&self) -> bool {
        self.report_id.is_some()
    }
}

/// The audit engine facade
pub struct AuditEngine {
    store: Arc<dyn ReportStore>,
    check_timeout: Duration,
    max_concurrent_checks: usize,
}

impl AuditEngine {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            check_timeout: Duration::from_secs(10),
            max_concurrent_checks: 8,
        }
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_checks(mut self, max: usize) -> Self {
        self.max_concurrent_checks = max;
        self
    }

    /// Run the full check battery for the context's target
    ///
    /// Hosting domains are validated up front: an unrecognized domain is a
    /// `ValidationFailure` and no checks run. Probe faults inside checks
    /// never surface here; they arrive as Danger findings. A store failure
    /// is reported on the outcome, not raised, so the findings survive it.
    pub async fn run_scan(&self, ctx: ScanContext, owner: &str) -> Result<ScanOutcome> {
        if let Target::HostingDomain(domain) = &ctx.target {
            if !cloudaudit_hosting::validate_domain(domain) {
                return Err(Error::ValidationFailure(format!(
                    "not a recognized hosting domain: {}",
                    domain
                )));
            }
        }

        let kind = ctx.target.kind();
        let checks = match kind {
            TargetKind::Mongo => cloudaudit_mongo::checks(),
            TargetKind::Firestore => cloudaudit_firestore::checks(),
            TargetKind::Hosting => cloudaudit_hosting::checks(),
        };

        let ctx = ctx.with_check_timeout(self.check_timeout);
        let raw = runner::run_checks(&ctx, &checks, self.max_concurrent_checks).await;
        let findings = FindingSet::aggregate(raw.into_iter().map(Finding::from_raw));

        let (good, warning, danger) = findings.counts();
        info!(
            service = kind.service_name(),
            good, warning, danger, "scan complete"
        );

        let report = ScanReport::new(kind.service_name(), owner, findings);
        Ok(self.record(report).await)
    }

    /// Analyze script content and record the result as a scan report
    ///
    /// The analyzer output maps to findings by the fixed rule (errors are
    /// Danger, warnings Warning, good practices Good); the keyword
    /// classifier is not involved.
    pub async fn analyze_script(
        &self,
        kind: ScriptKind,
        content: &str,
        owner: &str,
    ) -> ScanOutcome {
        let analysis = validate_script(kind, content);
        let check_name = analysis_check_name(kind);
        let findings = FindingSet::aggregate(analysis.into_findings(check_name));

        let report = ScanReport::new(script_service_name(kind), owner, findings);
        self.record(report).await
    }

    /// Validate script content without recording anything
    pub fn validate(&self, kind: ScriptKind, content: &str) -> AnalysisResult {
        validate_script(kind, content)
    }

    /// Recompute per-service summaries from the stored report log
    pub async fn get_analytics(&self, filter: &ReportFilter) -> Result<Vec<AnalyticsSummary>> {
        let reports = self.store.query_reports(filter).await?;
        Ok(rollup(&reports))
    }

    async fn record(&self, report: ScanReport) -> ScanOutcome {
        match self.store.insert_report(&report).await {
            Ok(id) => ScanOutcome {
                report,
                report_id: Some(id),
                store_error: None,
            },
            Err(e) => {
                warn!(error = %e, "report could not be stored; returning findings anyway");
                ScanOutcome {
                    report,
                    report_id: None,
                    store_error: Some(e),
                }
            }
        }
    }
}

fn script_service_name(kind: ScriptKind) -> &'static str {
    match kind {
        ScriptKind::Sql => "SQL",
        ScriptKind::Json => "JSON",
    }
}

fn analysis_check_name(kind: ScriptKind) -> &'static str {
    match kind {
        ScriptKind::Sql => "SQL Analysis",
        ScriptKind::Json => "JSON Analysis",
    }
}
