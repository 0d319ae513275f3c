//! Products.
//!
//! The three barcode columns form one value space: a barcode may appear in
//! any of them on at most one product.

use crate::models::{EntityKind, ReferenceKind};
use crate::reconciliation::{EntityOrchestrator, EntityProfile};
use crate::validation::{CreatePolicy, ProtectionRule, ReferenceRule, UniqueField};

static PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Products,
    check_names: true,
    mandatory_fields: &["name"],
    references: &[ReferenceRule::optional("packing_id", ReferenceKind::Packing)],
    unique_fields: &[
        UniqueField {
            label: "name",
            columns: &["name"],
        },
        UniqueField {
            label: "barcode",
            columns: &["barcode", "barcode_2", "barcode_3"],
        },
    ],
    protections: &[
        ProtectionRule::soft(ReferenceKind::RotationGroupItem, "product_id"),
        ProtectionRule::soft(ReferenceKind::MachineColumn, "product_id"),
        ProtectionRule::soft(ReferenceKind::PlanogramItem, "product_id"),
    ],
    create_policy: CreatePolicy::UpgradeToUpdate,
    extra_references: &[],
    uses_meter_settings: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductOrchestrator;

impl EntityOrchestrator for ProductOrchestrator {
    fn profile(&self) -> &EntityProfile {
        &PROFILE
    }
}
