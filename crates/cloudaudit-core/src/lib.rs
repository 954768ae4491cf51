//! CloudAudit Core - Foundation types, traits, and error handling
//!
//! This crate provides the core abstractions used throughout the CloudAudit
//! engine:
//! - `Target`: the resource under audit (database connection, credential, domain)
//! - `Check`: the trait that all audit checks implement
//! - `CheckOutcome` / `RawResult`: structured outcome of a single check
//! - `Finding`, `FindingSet`, `ScanReport`: classified results and reports
//! - `Category`: severity tiers (Good, Warning, Danger)
//! - Probe capability traits consumed by the target adapters

pub mod category;
pub mod check;
pub mod classify;
pub mod error;
pub mod finding;
pub mod probe;
pub mod target;

// Re-export commonly used types at crate root
pub use category::Category;
pub use check::{Check, CheckOutcome, Fault, RawResult, ScanContext};
pub use classify::classify;
pub use error::{Error, Result};
pub use finding::{AnalysisResult, AnalyticsSummary, Finding, FindingSet, ScanReport};
pub use probe::{AdminProbe, DocumentProbe, HttpProbe, HttpResponse, ProbeError};
pub use target::{Target, TargetKind};
