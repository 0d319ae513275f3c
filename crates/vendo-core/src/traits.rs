//! Multi-Tenant Traits
//!
//! # Example
//!
//! ```
//! use vendo_core::{CompanyId, CompanyAware};
//!
//! struct Machine {
//!     company_id: CompanyId,
//!     external_id: String,
//! }
//!
//! impl CompanyAware for Machine {
//!     fn company_id(&self) -> CompanyId {
//!         self.company_id
//!     }
//! }
//!
//! let company = CompanyId::new(3);
//! let machine = Machine { company_id: company, external_id: "M1".to_string() };
//! assert!(machine.belongs_to(company));
//! ```

use crate::ids::CompanyId;

/// Trait for values that belong to a specific company.
///
/// Object-safe, so `&dyn CompanyAware` works.
pub trait CompanyAware {
    /// Returns the company ID associated with this value.
    fn company_id(&self) -> CompanyId;

    /// Whether this value is scoped to `company_id`.
    fn belongs_to(&self, company_id: CompanyId) -> bool {
        self.company_id() == company_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestEntity {
        company_id: CompanyId,
    }

    impl CompanyAware for TestEntity {
        fn company_id(&self) -> CompanyId {
            self.company_id
        }
    }

    #[test]
    fn test_belongs_to() {
        let entity = TestEntity {
            company_id: CompanyId::new(1),
        };
        assert!(entity.belongs_to(CompanyId::new(1)));
        assert!(!entity.belongs_to(CompanyId::new(2)));
    }

    #[test]
    fn test_object_safety() {
        let entity = TestEntity {
            company_id: CompanyId::new(9),
        };
        let dyn_ref: &dyn CompanyAware = &entity;
        assert_eq!(dyn_ref.company_id(), CompanyId::new(9));
    }
}
