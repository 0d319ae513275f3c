//! Locations.

use crate::models::{EntityKind, ReferenceKind};
use crate::reconciliation::{EntityOrchestrator, EntityProfile};
use crate::validation::{CreatePolicy, ProtectionRule, ReferenceRule, UniqueField};

static PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Locations,
    check_names: true,
    mandatory_fields: &["name"],
    references: &[
        ReferenceRule::optional("region_id", ReferenceKind::Region),
        ReferenceRule::optional("client_id", ReferenceKind::Client),
    ],
    unique_fields: &[UniqueField {
        label: "name",
        columns: &["name"],
    }],
    protections: &[ProtectionRule::soft(ReferenceKind::Machine, "location_id")],
    create_policy: CreatePolicy::UpgradeToUpdate,
    extra_references: &[],
    uses_meter_settings: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocationOrchestrator;

impl EntityOrchestrator for LocationOrchestrator {
    fn profile(&self) -> &EntityProfile {
        &PROFILE
    }
}
