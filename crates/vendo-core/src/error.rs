//! Error Types
//!
//! Standardized error types shared by Vendo crates.
//!
//! # Example
//!
//! ```
//! use vendo_core::{CompanyId, Result, VendoError};
//!
//! fn ensure_company(expected: CompanyId, actual: CompanyId) -> Result<()> {
//!     if expected != actual {
//!         return Err(VendoError::CompanyMismatch { expected, actual });
//!     }
//!     Ok(())
//! }
//! ```

use crate::ids::CompanyId;
use serde::Serialize;
use thiserror::Error;

/// Standardized error type for Vendo.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VendoError {
    /// Company isolation violation.
    ///
    /// Raised when a value scoped to one company is handed to an operation
    /// running for another.
    #[error("Company mismatch: expected {expected}, got {actual}")]
    CompanyMismatch {
        /// The expected company ID
        expected: CompanyId,
        /// The actual company ID that was provided
        actual: CompanyId,
    },
}

/// Type alias for Results using `VendoError`.
pub type Result<T> = std::result::Result<T, VendoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_mismatch_display() {
        let error = VendoError::CompanyMismatch {
            expected: CompanyId::new(1),
            actual: CompanyId::new(2),
        };
        assert_eq!(error.to_string(), "Company mismatch: expected 1, got 2");
    }

    #[test]
    fn test_company_mismatch_serializes_tagged() {
        let error = VendoError::CompanyMismatch {
            expected: CompanyId::new(3),
            actual: CompanyId::new(4),
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["type"], "company_mismatch");
        assert_eq!(json["expected"], 3);
        assert_eq!(json["actual"], 4);
    }
}
