//! Packings.
//!
//! Packings are named after their product, so only external ids are
//! deduplicated. A packing still used on a planogram cannot be deleted.

use crate::models::{EntityKind, ReferenceKind};
use crate::reconciliation::{EntityOrchestrator, EntityProfile};
use crate::validation::{CreatePolicy, ProtectionRule, ReferenceRule, UniqueField};

static PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Packings,
    check_names: false,
    mandatory_fields: &["product_id"],
    references: &[ReferenceRule::required("product_id", ReferenceKind::Product)],
    unique_fields: &[UniqueField {
        label: "barcode",
        columns: &["barcode"],
    }],
    protections: &[ProtectionRule::hard(ReferenceKind::PlanogramItem, "packing_id")],
    create_policy: CreatePolicy::UpgradeToUpdate,
    extra_references: &[],
    uses_meter_settings: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PackingOrchestrator;

impl EntityOrchestrator for PackingOrchestrator {
    fn profile(&self) -> &EntityProfile {
        &PROFILE
    }
}
