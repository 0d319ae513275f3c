//! Planograms.

use crate::models::{EntityKind, ReferenceKind};
use crate::reconciliation::{EntityOrchestrator, EntityProfile};
use crate::validation::{CreatePolicy, ReferenceRule};

static PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Planograms,
    check_names: true,
    mandatory_fields: &["name", "machine_id"],
    references: &[ReferenceRule::required("machine_id", ReferenceKind::Machine)],
    unique_fields: &[],
    protections: &[],
    create_policy: CreatePolicy::UpgradeToUpdate,
    extra_references: &[],
    uses_meter_settings: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanogramOrchestrator;

impl EntityOrchestrator for PlanogramOrchestrator {
    fn profile(&self) -> &EntityProfile {
        &PROFILE
    }
}
