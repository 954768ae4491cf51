//! Report store interface and the in-memory implementation
//!
//! The store is append-only: reports are inserted once and never updated.
//! Every operation is independently atomic; readers need only eventual
//! consistency with prior writes.

use async_trait::async_trait;
use cloudaudit_core::{Error, Result, ScanReport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Scoping for report queries and rollups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Restrict to one service ("MongoDB", "SQL", ...)
    pub service: Option<String>,

    /// Restrict to one owner's reports
    pub owner: Option<String>,
}

impl ReportFilter {
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Default::default()
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn matches(&self, report: &ScanReport) -> bool {
        if let Some(service) = &self.service {
            if &report.service != service {
                return false;
            }
        }
        if let Some(owner) = &self.owner {
            if &report.owner != owner {
                return false;
            }
        }
        true
    }
}

/// Append-only persistence for scan reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a report, returning its id
    async fn insert_report(&self, report: &ScanReport) -> Result<Uuid>;

    /// All reports matching the filter, in insertion order
    async fn query_reports(&self, filter: &ReportFilter) -> Result<Vec<ScanReport>>;

    /// Number of reports matching the filter
    async fn count_reports(&self, filter: &ReportFilter) -> Result<u64>;
}

/// In-memory report store
///
/// Backs tests and one-shot CLI runs where nothing needs to outlive the
/// process.
#[derive(Default)]
pub struct MemoryStore {
    reports: RwLock<Vec<ScanReport>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert_report(&self, report: &ScanReport) -> Result<Uuid> {
        let mut reports = self.reports.write().await;
        if reports.iter().any(|r| r.id == report.id) {
            return Err(Error::PersistenceFailure(format!(
                "duplicate report id {}",
                report.id
            )));
        }
        reports.push(report.clone());
        Ok(report.id)
    }

    async fn query_reports(&self, filter: &ReportFilter) -> Result<Vec<ScanReport>> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn count_reports(&self, filter: &ReportFilter) -> Result<u64> {
        let reports = self.reports.read().await;
        Ok(reports.iter().filter(|r| filter.matches(r)).count() as u64)
    }
}

/// File-backed report store
///
/// Persists the report log as one JSON array so one-shot CLI invocations
/// accumulate a log that later `analytics` runs can roll up. The whole log
/// is rewritten on every insert, which is fine at CLI scale; a service
/// deployment would put a real database behind the trait instead.
pub struct JsonFileStore {
    path: PathBuf,
    // serializes load-modify-save cycles within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<ScanReport>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::PersistenceFailure(format!(
                "failed to read report log {}: {}",
                self.path.display(),
                e
            ))
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            Error::PersistenceFailure(format!(
                "report log {} is not valid JSON: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, reports: &[ScanReport]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::PersistenceFailure(format!(
                        "failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let content = serde_json::to_string_pretty(reports)
            .map_err(|e| Error::PersistenceFailure(format!("failed to encode report log: {}", e)))?;
        std::fs::write(&self.path, content).map_err(|e| {
            Error::PersistenceFailure(format!(
                "failed to write report log {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl ReportStore for JsonFileStore {
    async fn insert_report(&self, report: &ScanReport) -> Result<Uuid> {
        let _guard = self.lock.lock().await;
        let mut reports = self.load()?;
        if reports.iter().any(|r| r.id == report.id) {
            return Err(Error::PersistenceFailure(format!(
                "duplicate report id {}",
                report.id
            )));
        }
        reports.push(report.clone());
        self.save(&reports)?;
        Ok(report.id)
    }

    async fn query_reports(&self, filter: &ReportFilter) -> Result<Vec<ScanReport>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    async fn count_reports(&self, filter: &ReportFilter) -> Result<u64> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.iter().filter(|r| filter.matches(r)).count() as u64)
    }
}
