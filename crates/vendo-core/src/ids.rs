//! Strongly Typed Identifiers
//!
//! Newtype wrappers over the platform's integer keys. Company and entity
//! ids share the same storage type, so the wrappers keep them apart at
//! compile time.
//!
//! # Example
//!
//! ```
//! use vendo_core::{CompanyId, EntityId};
//!
//! let company = CompanyId::new(1);
//! let machine = EntityId::new(1);
//!
//! fn requires_company(id: CompanyId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_company(company);
//! // requires_company(machine); // This would not compile!
//! # let _ = machine;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying integer parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed integer ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw database key.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for companies (tenants).
    ///
    /// Every import batch, persisted snapshot and lease is scoped by one
    /// company id.
    ///
    /// # Example
    ///
    /// ```
    /// use vendo_core::CompanyId;
    ///
    /// let company_id: CompanyId = "17".parse().unwrap();
    /// assert_eq!(company_id.as_i64(), 17);
    /// ```
    CompanyId
);

define_id!(
    /// Internal storage id of a persisted entity (machine, product, ...).
    ///
    /// Distinct from the tenant-supplied external id, which is a string.
    EntityId
);
