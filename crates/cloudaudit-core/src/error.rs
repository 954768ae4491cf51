//! Error types for the CloudAudit engine

use thiserror::Error;

/// Result type alias using the CloudAudit Error
pub type Result<T> = std::result::Result<T, Error>;

/// CloudAudit error types
///
/// Probe-level faults (connection/permission) raised while executing a check
/// are absorbed into findings by the runner and never reach callers; the
/// variants here cover the caller-visible failures plus infrastructure
/// errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    #[error("Permission failure: {0}")]
    PermissionFailure(String),

    #[error("Validation failure: {0}")]
    ValidationFailure(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors that are surfaced to callers as hard failures; everything
    /// else is contained as a finding or fails the service internally.
    pub fn is_caller_visible(&self) -> bool {
        matches!(
            self,
            Error::ValidationFailure(_) | Error::PersistenceFailure(_)
        )
    }

    /// Get an error code for logging/metrics
    pub fn code(&self) -> &'static str {
        match self {
            Error::ConnectionFailure(_) => "CONNECTION_FAILURE",
            Error::PermissionFailure(_) => "PERMISSION_FAILURE",
            Error::ValidationFailure(_) => "VALIDATION_FAILURE",
            Error::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::MissingConfig { .. } => "MISSING_CONFIG",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
