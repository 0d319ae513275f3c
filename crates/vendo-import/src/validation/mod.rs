//! Constraint validators.
//!
//! Each validator reads the batch and the snapshot and appends to a
//! [`ValidationReport`](crate::messages::ValidationReport). Only
//! [`referential`] returns a new batch, carrying resolved reference ids.

pub mod action_check;
pub mod mandatory;
pub mod protection;
pub mod referential;
pub mod uniqueness;

pub use action_check::{check_action_existence, CreatePolicy};
pub use mandatory::check_mandatory_fields;
pub use protection::{check_protected_deletions, deletion_guard, ProtectionRule};
pub use referential::{check_references, ReferenceRule};
pub use uniqueness::{handle_field_uniqueness, UniqueField};
