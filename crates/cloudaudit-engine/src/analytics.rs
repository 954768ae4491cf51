//! Analytics rollup over the stored report log
//!
//! Summaries are derived, never stored: each call recomputes from whatever
//! reports the store returned. `scan_count` counts scans; the per-category
//! totals count findings.

use chrono::{DateTime, Utc};
use cloudaudit_core::{AnalyticsSummary, ScanReport};
use std::collections::BTreeMap;

struct Accumulator {
    scan_count: u64,
    latest_timestamp: DateTime<Utc>,
    good_count: u64,
    warning_count: u64,
    danger_count: u64,
}

/// Group reports by service and total their findings
///
/// A report whose findings field was absent in storage deserializes to an
/// empty set and contributes zero to every category; it still counts as a
/// scan. Output is sorted by service name for stable presentation.
pub fn rollup(reports: &[ScanReport]) -> Vec<AnalyticsSummary> {
    let mut by_service: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for report in reports {
        let (good, warning, danger) = report.findings.counts();
        let acc = by_service
            .entry(report.service.as_str())
            .or_insert(Accumulator {
                scan_count: 0,
                latest_timestamp: report.timestamp,
                good_count: 0,
                warning_count: 0,
                danger_count: 0,
            });
        acc.scan_count += 1;
        acc.latest_timestamp = acc.latest_timestamp.max(report.timestamp);
        acc.good_count += good as u64;
        acc.warning_count += warning as u64;
        acc.danger_count += danger as u64;
    }

    by_service
        .into_iter()
        .map(|(service, acc)| AnalyticsSummary {
            service: service.to_string(),
            scan_count: acc.scan_count,
            latest_timestamp: acc.latest_timestamp,
            good_count: acc.good_count,
            warning_count: acc.warning_count,
            danger_count: acc.danger_count,
        })
        .collect()
}

/// The service with the most recorded scans, for dashboard headlines
///
/// Ties resolve to the first service in summary order (alphabetical, per
/// `rollup`).
pub fn most_scanned(summaries: &[AnalyticsSummary]) -> Option<&AnalyticsSummary> {
    summaries.iter().max_by(|a, b| {
        a.scan_count
            .cmp(&b.scan_count)
            .then_with(|| b.service.cmp(&a.service))
    })
}
