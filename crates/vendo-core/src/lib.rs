//! Vendo Core Library
//!
//! Shared types and traits for the Vendo vending-management platform.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (CompanyId, EntityId)
//! - [`traits`] - Multi-tenant traits (CompanyAware)
//! - [`error`] - Standardized error types (VendoError)
//!
//! # Example
//!
//! ```
//! use vendo_core::{CompanyId, EntityId, VendoError, Result};
//!
//! let company_id = CompanyId::new(42);
//! let entity_id = EntityId::new(7);
//!
//! fn example(company_id: CompanyId) -> Result<()> {
//!     Err(VendoError::CompanyMismatch {
//!         expected: company_id,
//!         actual: CompanyId::new(43),
//!     })
//! }
//! ```

pub mod error;
pub mod ids;
pub mod traits;

pub use error::{Result, VendoError};
pub use ids::{CompanyId, EntityId, ParseIdError};
pub use traits::CompanyAware;
