//! Machines.
//!
//! Besides the shared checks, machines carry a meter-type key that is only
//! meaningful when the company has meter tracking switched on.

use crate::messages::{MessageKind, ValidationMessage, ValidationReport};
use crate::models::{Batch, EntityKind, ImportRow, ReferenceKind};
use crate::reconciliation::{EntityOrchestrator, EntityProfile, Snapshot};
use crate::validation::{CreatePolicy, ProtectionRule, ReferenceRule, UniqueField};

const METER_COLUMN: &str = "meter_type";

static PROFILE: EntityProfile = EntityProfile {
    kind: EntityKind::Machines,
    check_names: true,
    mandatory_fields: &["name", "location_id", "machine_type_id"],
    references: &[
        ReferenceRule::required("location_id", ReferenceKind::Location),
        ReferenceRule::required("machine_type_id", ReferenceKind::MachineType),
        ReferenceRule::optional("machine_category_id", ReferenceKind::MachineCategory),
        ReferenceRule::optional("warehouse_id", ReferenceKind::Warehouse),
    ],
    unique_fields: &[UniqueField {
        label: "name",
        columns: &["name"],
    }],
    protections: &[ProtectionRule::soft(ReferenceKind::Planogram, "machine_id")],
    create_policy: CreatePolicy::UpgradeToUpdate,
    extra_references: &[ReferenceKind::MeterType],
    uses_meter_settings: true,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct MachineOrchestrator;

impl MachineOrchestrator {
    fn check_meter_type(row: ImportRow, snapshot: &Snapshot, report: &mut ValidationReport) -> ImportRow {
        if row.is_delete() {
            return row;
        }
        let Some(meter) = row.value_key(METER_COLUMN) else {
            return row;
        };

        if !snapshot.meters_enabled {
            report.warn(
                ValidationMessage::for_record(row.record(), MessageKind::MeterSettingsDisabled)
                    .with_arg(METER_COLUMN),
            );
            return row.without_field(METER_COLUMN);
        }

        match snapshot.references.find_alive(ReferenceKind::MeterType, &meter) {
            Some(record) => row.with_resolved(METER_COLUMN, record.id),
            None => {
                report.warn(
                    ValidationMessage::for_record(row.record(), MessageKind::ReferenceNotFound)
                        .with_arg(METER_COLUMN)
                        .with_arg(&meter)
                        .with_arg(ReferenceKind::MeterType),
                );
                row
            }
        }
    }
}

impl EntityOrchestrator for MachineOrchestrator {
    fn profile(&self) -> &EntityProfile {
        &PROFILE
    }

    fn kind_checks(&self, batch: Batch, snapshot: &Snapshot, report: &mut ValidationReport) -> Batch {
        batch.map_rows(|row| Self::check_meter_type(row, snapshot, report))
    }
}
