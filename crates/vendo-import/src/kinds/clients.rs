//! Clients.

use crate::models::{EntityKind, ReferenceKind};
use crate::reconciliation::{EntityOrchestrator, EntityProfile};
use crate::validation::{CreatePolicy, ProtectionRule, ReferenceRule, UniqueField};

static PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Clients,
    check_names: true,
    mandatory_fields: &["name"],
    references: &[ReferenceRule::required("client_type_id", ReferenceKind::ClientType)],
    unique_fields: &[UniqueField {
        label: "name",
        columns: &["name"],
    }],
    protections: &[
        ProtectionRule::soft(ReferenceKind::Machine, "client_id"),
        ProtectionRule::soft(ReferenceKind::Location, "client_id"),
    ],
    create_policy: CreatePolicy::UpgradeToUpdate,
    extra_references: &[],
    uses_meter_settings: false,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClientOrchestrator;

impl EntityOrchestrator for ClientOrchestrator {
    fn profile(&self) -> &EntityProfile {
        &PROFILE
    }
}
