//! Findings, reports, and derived analytics shapes

use crate::category::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A classified (category, message) pair attributable to one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Check that produced this finding
    pub check_name: String,

    /// Human-readable result text
    pub message: String,

    /// Severity tier
    pub category: Category,
}

impl Finding {
    pub fn new(
        check_name: impl Into<String>,
        category: Category,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_name: check_name.into(),
            message: message.into(),
            category,
        }
    }

    pub fn good(check_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check_name, Category::Good, message)
    }

    pub fn warning(check_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check_name, Category::Warning, message)
    }

    pub fn danger(check_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check_name, Category::Danger, message)
    }
}

/// Per-category partition of a scan's findings
///
/// The three lists are disjoint and together cover every check run. Order
/// within each list follows check declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingSet {
    #[serde(default)]
    pub good: Vec<Finding>,
    #[serde(default)]
    pub warning: Vec<Finding>,
    #[serde(default)]
    pub danger: Vec<Finding>,
}

impl FindingSet {
    /// Partition findings by category, preserving input order
    pub fn aggregate(findings: impl IntoIterator<Item = Finding>) -> Self {
        let mut set = FindingSet::default();
        for finding in findings {
            set.push(finding);
        }
        set
    }

    pub fn push(&mut self, finding: Finding) {
        match finding.category {
            Category::Good => self.good.push(finding),
            Category::Warning => self.warning.push(finding),
            Category::Danger => self.danger.push(finding),
        }
    }

    /// Total number of findings across all categories
    pub fn len(&self) -> usize {
        self.good.len() + self.warning.len() + self.danger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (good, warning, danger) counts
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.good.len(), self.warning.len(), self.danger.len())
    }
}

/// The persisted, immutable record of one completed scan
///
/// Write-once: reports are inserted into the append-only store and never
/// updated. Analytics are always recomputed from the report log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Unique report ID
    pub id: Uuid,

    /// Service the scan ran against ("MongoDB", "Firestore", "Firebase Hosting", "SQL", "JSON")
    pub service: String,

    /// Classified findings; absent in some legacy stored documents
    #[serde(default)]
    pub findings: FindingSet,

    /// When the scan completed
    pub timestamp: DateTime<Utc>,

    /// Opaque caller id recorded for ownership; never interpreted
    pub owner: String,
}

impl ScanReport {
    pub fn new(
        service: impl Into<String>,
        owner: impl Into<String>,
        findings: FindingSet,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            service: service.into(),
            findings,
            timestamp: Utc::now(),
            owner: owner.into(),
        }
    }
}

/// Output of the script analyzers
///
/// A second result shape, disjoint by construction: an analyzer decides the
/// bucket for every entry as it emits it, so this never passes through the
/// text classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub good_practices: Vec<String>,
}

impl AnalysisResult {
    /// A terminal result holding a single format error
    pub fn format_error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Default::default()
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn good(&mut self, message: impl Into<String>) {
        self.good_practices.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.good_practices.is_empty()
    }

    /// Fixed mapping into findings: errors are Danger, warnings are Warning,
    /// good practices are Good. Never keyword-classified.
    pub fn into_findings(self, analyzer: &str) -> Vec<Finding> {
        let mut findings = Vec::with_capacity(
            self.errors.len() + self.warnings.len() + self.good_practices.len(),
        );
        findings.extend(
            self.errors
                .into_iter()
                .map(|m| Finding::danger(analyzer, m)),
        );
        findings.extend(
            self.warnings
                .into_iter()
                .map(|m| Finding::warning(analyzer, m)),
        );
        findings.extend(
            self.good_practices
                .into_iter()
                .map(|m| Finding::good(analyzer, m)),
        );
        findings
    }
}

/// Per-service rollup of the stored report log
///
/// Derived and recomputed on demand; never stored as a source of truth.
/// `scan_count` counts scans, not findings - per-category totals carry the
/// finding counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub service: String,
    pub scan_count: u64,
    pub latest_timestamp: DateTime<Utc>,
    pub good_count: u64,
    pub warning_count: u64,
    pub danger_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_partitions_disjointly() {
        let findings = vec![
            Finding::danger("Auth", "Error: authentication disabled"),
            Finding::good("TLS", "TLS enabled"),
            Finding::warning("Port", "Default port in use"),
            Finding::good("Logging", "Logging enabled"),
        ];
        let total = findings.len();

        let set = FindingSet::aggregate(findings);
        assert_eq!(set.len(), total);
        assert_eq!(set.counts(), (2, 1, 1));
        // Input order preserved within each bucket
        assert_eq!(set.good[0].check_name, "TLS");
        assert_eq!(set.good[1].check_name, "Logging");
    }

    #[test]
    fn test_report_missing_findings_deserializes_empty() {
        let json = r#"{
            "id": "9e107d9d-ef5b-4f1c-a4bc-0d4f3bba9e1b",
            "service": "SQL",
            "timestamp": "2026-01-15T10:00:00Z",
            "owner": "user-1"
        }"#;
        let report: ScanReport = serde_json::from_str(json).unwrap();
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_analysis_result_fixed_mapping() {
        let mut result = AnalysisResult::default();
        result.error("Missing WHERE clause");
        result.warning("Statement not terminated");
        result.good("Explicit column list");

        let findings = result.into_findings("SQL Analysis");
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].category, Category::Danger);
        assert_eq!(findings[1].category, Category::Warning);
        assert_eq!(findings[2].category, Category::Good);
        assert!(findings.iter().all(|f| f.check_name == "SQL Analysis"));
    }

    #[test]
    fn test_format_error_is_terminal_shape() {
        let result = AnalysisResult::format_error("Invalid JSON format");
        assert_eq!(result.errors.len(), 1);
        assert!(result.warnings.is_empty());
        assert!(result.good_practices.is_empty());
    }
}
