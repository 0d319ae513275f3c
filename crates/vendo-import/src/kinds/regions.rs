//! Regions.
//!
//! A region may name a parent created in the same file.

use crate::models::{EntityKind, ReferenceKind};
use crate::reconciliation::{EntityOrchestrator, EntityProfile};
use crate::validation::{CreatePolicy, ProtectionRule, ReferenceRule, UniqueField};

static PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Regions,
    check_names: true,
    mandatory_fields: &["name"],
    references: &[ReferenceRule::optional("parent_region_id", ReferenceKind::Region).within_batch()],
    unique_fields: &[UniqueField {
        label: "name",
        columns: &["name"],
    }],
    protections: &[
        ProtectionRule::soft(ReferenceKind::Location, "region_id"),
        ProtectionRule::soft(ReferenceKind::Machine, "region_id"),
    ],
    create_policy: CreatePolicy::UpgradeToUpdate,
    extra_references: &[],
    uses_meter_settings: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct RegionOrchestrator;

impl EntityOrchestrator for RegionOrchestrator {
    fn profile(&self) -> &EntityProfile {
        &PROFILE
    }
}
