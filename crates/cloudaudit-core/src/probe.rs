//! Probe capability traits consumed by the target adapters
//!
//! Adapters never open connections themselves; they receive these
//! capabilities through the `ScanContext`. Concrete implementations live
//! with the component that owns the transport (the hosting crate ships a
//! reqwest-backed `HttpProbe`; database probes are supplied by the embedding
//! service).

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Fault raised by a probe operation
///
/// The variants mirror the engine's containment rules: connection and
/// permission faults degrade to findings, `IndexRequired` is a signal some
/// checks probe for deliberately.
#[derive(Error, Debug, Clone)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("index required: {0}")]
    IndexRequired(String),

    #[error("{0}")]
    Other(String),
}

/// Administrative probe against a database deployment
///
/// `run_command` issues a named admin command (e.g. `getCmdLineOpts`,
/// `usersInfo`, `serverStatus`) and returns the raw response document.
#[async_trait]
pub trait AdminProbe: Send + Sync {
    async fn run_command(&self, name: &str) -> Result<Value, ProbeError>;

    async fn list_databases(&self) -> Result<Vec<String>, ProbeError>;

    async fn list_collections(&self, db: &str) -> Result<Vec<String>, ProbeError>;

    /// Fetch up to `limit` documents from a collection
    async fn find_documents(
        &self,
        db: &str,
        collection: &str,
        limit: usize,
    ) -> Result<Vec<Value>, ProbeError>;
}

/// Probe against a document store (Firestore)
#[async_trait]
pub trait DocumentProbe: Send + Sync {
    /// Fetch the deployed security rules source, if any are published
    async fn security_rules(&self) -> Result<Option<String>, ProbeError>;

    async fn list_collections(&self) -> Result<Vec<String>, ProbeError>;

    async fn documents(&self, collection: &str) -> Result<Vec<Value>, ProbeError>;

    /// Attempt a read without credentials; `true` means the read succeeded
    async fn unrestricted_read(&self, collection: &str) -> Result<bool, ProbeError>;

    /// Issue a synthetic range query over two fields
    ///
    /// Returns `ProbeError::IndexRequired` when the store rejects the query
    /// for lack of a composite index.
    async fn range_query(
        &self,
        collection: &str,
        first_field: &str,
        second_field: &str,
    ) -> Result<(), ProbeError>;
}

/// Minimal HTTP client capability used by the hosting adapter
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProbeError>;
}

/// HTTP response wrapper
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: String,
    /// Final URL (after any redirects the probe followed)
    pub final_url: String,
}

impl HttpResponse {
    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Get header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&String> {
        let name_lower = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == name_lower)
            .map(|(_, v)| v)
    }

    /// The Location header of a redirect response
    pub fn location(&self) -> Option<&String> {
        self.header("location")
    }
}
