//! Error types for the import reconciliation service.
//!
//! Validation failures are never errors: they come back inside a
//! [`crate::ValidationResult`]. `ImportError` covers the conditions that
//! mean "retry the system" or "the request itself is unusable".

use thiserror::Error;
use vendo_core::{CompanyId, VendoError};

/// Import service errors.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Batch contains more rows than the configured limit.
    #[error("Too many rows: {0}")]
    TooManyRows(String),

    /// A snapshot or reference set could not be fetched.
    #[error("Snapshot fetch failed for {source_kind}: {message}")]
    Snapshot { source_kind: String, message: String },

    /// The company lease could not be taken or released.
    #[error("Lease error for company {company_id}: {message}")]
    Lease { company_id: CompanyId, message: String },

    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Shared platform error (company isolation, not found).
    #[error(transparent)]
    Core(#[from] VendoError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ImportError {
    /// Create a snapshot fetch error.
    pub fn snapshot(source_kind: impl ToString, message: impl Into<String>) -> Self {
        Self::Snapshot {
            source_kind: source_kind.to_string(),
            message: message.into(),
        }
    }

    /// Create a lease error.
    pub fn lease(company_id: CompanyId, message: impl Into<String>) -> Self {
        Self::Lease {
            company_id,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this error is transient, i.e. the same request may succeed
    /// on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ImportError::Snapshot { .. } | ImportError::Lease { .. } | ImportError::Database(_)
        )
    }
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
