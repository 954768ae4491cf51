//! Check trait and execution context - the interface all audit checks implement

use crate::category::Category;
use crate::probe::{AdminProbe, DocumentProbe, HttpProbe, ProbeError};
use crate::target::Target;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// The trait that all audit checks implement
///
/// A check is a named probe bound to one target kind. It is pure with
/// respect to engine state but may perform network I/O through the
/// capabilities on the context. Checks run concurrently within a scan and
/// must not share mutable state.
#[async_trait]
pub trait Check: Send + Sync {
    /// Human-readable name, stable across runs (used as the finding key)
    fn name(&self) -> &str;

    /// Execute the check against the given context
    async fn run(&self, ctx: &ScanContext) -> CheckOutcome;
}

/// Structured outcome of a single check execution
///
/// New checks return `Classified` and carry their category explicitly;
/// `Text` exists for legacy checks whose output is bucketed by the keyword
/// classifier shim (see `classify`). `Fault` records an execution failure
/// and always classifies as Danger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Category decided by the check itself
    Classified(Category, String),

    /// Free text, classified downstream by keyword convention (lossy)
    Text(String),

    /// The check could not execute
    Fault(Fault),
}

impl CheckOutcome {
    pub fn good(message: impl Into<String>) -> Self {
        CheckOutcome::Classified(Category::Good, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        CheckOutcome::Classified(Category::Warning, message.into())
    }

    pub fn danger(message: impl Into<String>) -> Self {
        CheckOutcome::Classified(Category::Danger, message.into())
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, CheckOutcome::Fault(_))
    }
}

/// Execution fault kinds, carried on the outcome rather than raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Target unreachable or request timed out
    Connection(String),
    /// Insufficient privilege on the target
    Permission(String),
    /// Anything else that kept the check from completing
    Unexpected(String),
}

impl Fault {
    pub fn message(&self) -> &str {
        match self {
            Fault::Connection(m) | Fault::Permission(m) | Fault::Unexpected(m) => m,
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::Connection(m) => write!(f, "Connection failure: {}", m),
            Fault::Permission(m) => write!(f, "Permission failure: {}", m),
            Fault::Unexpected(m) => write!(f, "Unexpected failure: {}", m),
        }
    }
}

impl From<ProbeError> for Fault {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Connection(m) => Fault::Connection(m),
            ProbeError::Permission(m) => Fault::Permission(m),
            ProbeError::IndexRequired(m) | ProbeError::Other(m) => Fault::Unexpected(m),
        }
    }
}

/// The (check name, outcome) pair emitted by the runner, in declaration order
#[derive(Debug, Clone)]
pub struct RawResult {
    pub check_name: String,
    pub outcome: CheckOutcome,
}

impl RawResult {
    pub fn new(check_name: impl Into<String>, outcome: CheckOutcome) -> Self {
        Self {
            check_name: check_name.into(),
            outcome,
        }
    }
}

/// Context passed to checks during execution
///
/// Carries the target and the probe capabilities explicitly; there are no
/// ambient clients. Capabilities are optional because each adapter only
/// needs its own - a check that finds its probe missing reports a fault.
#[derive(Clone)]
pub struct ScanContext {
    /// The target being audited
    pub target: Target,

    /// Database admin probe (Mongo adapter)
    pub admin: Option<Arc<dyn AdminProbe>>,

    /// Document store probe (Firestore adapter)
    pub documents: Option<Arc<dyn DocumentProbe>>,

    /// HTTP client (hosting adapter)
    pub http: Option<Arc<dyn HttpProbe>>,

    /// Per-check timeout applied by the runner
    pub check_timeout: Duration,
}

impl ScanContext {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            admin: None,
            documents: None,
            http: None,
            check_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_admin(mut self, probe: Arc<dyn AdminProbe>) -> Self {
        self.admin = Some(probe);
        self
    }

    pub fn with_documents(mut self, probe: Arc<dyn DocumentProbe>) -> Self {
        self.documents = Some(probe);
        self
    }

    pub fn with_http(mut self, probe: Arc<dyn HttpProbe>) -> Self {
        self.http = Some(probe);
        self
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ScanContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("target", &self.target.display())
            .field("admin", &self.admin.as_ref().map(|_| "..."))
            .field("documents", &self.documents.as_ref().map(|_| "..."))
            .field("http", &self.http.as_ref().map(|_| "..."))
            .field("check_timeout", &self.check_timeout)
            .finish()
    }
}
