//! Reconciliation engine tests.
//!
//! End-to-end runs of the per-kind orchestrators against in-memory
//! snapshots:
//! - Action normalization scenarios
//! - Full resync expansion, resurrection and deletion guards
//! - Fail-fast checkpoints (dedup, mandatory fields)
//! - Referential, uniqueness and protected-deletion checks

mod common;

use common::*;
use vendo_core::EntityId;
use vendo_import::{
    orchestrator_for, EntityKind, FieldValue, ImportAction, ImportRow, MessageKind,
    PersistedEntity, ReferenceData, ReferenceKind, ReferenceRecord, Snapshot, ValidationResult,
};

fn machine_references() -> ReferenceData {
    ReferenceData::new()
        .with_set(ReferenceKind::Location, vec![alive_ref(10, "L1")])
        .with_set(ReferenceKind::MachineType, vec![alive_ref(20, "T1")])
}

fn reconcile(kind: EntityKind, rows: Vec<ImportRow>, snapshot: &Snapshot) -> ValidationResult {
    init_test_logging();
    orchestrator_for(kind).reconcile(batch(kind, rows), snapshot)
}

fn kinds_of(messages: &[vendo_import::ValidationMessage]) -> Vec<MessageKind> {
    messages.iter().map(|m| m.kind).collect()
}

// =============================================================================
// Normalization scenarios
// =============================================================================

#[test]
fn test_create_of_new_machine() {
    let snapshot = Snapshot::default().with_references(machine_references());
    let result = reconcile(
        EntityKind::Machines,
        vec![machine("M1", ImportAction::Create)],
        &snapshot,
    );

    assert!(result.is_success(), "{:?}", result.errors);
    assert_eq!(result.plan.len(), 1);
    assert_eq!(result.plan[0].external_id, "M1");
    assert_eq!(result.plan[0].action, ImportAction::Create);
    assert_eq!(result.plan[0].resolved.get("location_id"), Some(&EntityId::new(10)));
    assert_eq!(result.summary.creates, 1);
}

#[test]
fn test_update_of_missing_machine_becomes_create() {
    let snapshot = Snapshot::default().with_references(machine_references());
    let result = reconcile(
        EntityKind::Machines,
        vec![machine("M1", ImportAction::Update)],
        &snapshot,
    );

    assert!(result.is_success());
    assert_eq!(result.plan[0].action, ImportAction::Create);
    assert_eq!(result.plan[0].declared_action, ImportAction::Update);
}

#[test]
fn test_create_of_existing_machine_becomes_update() {
    let snapshot = Snapshot::new(vec![PersistedEntity::new(1, "M1", true)])
        .with_references(machine_references());
    let result = reconcile(
        EntityKind::Machines,
        vec![machine("M1", ImportAction::Create)],
        &snapshot,
    );

    assert!(result.is_success(), "{:?}", result.errors);
    assert_eq!(result.plan[0].action, ImportAction::Update);
    assert_eq!(result.summary.updates, 1);
}

#[test]
fn test_create_of_existing_user_is_found() {
    let snapshot = Snapshot::new(vec![PersistedEntity::new(1, "U1", true)]);
    let result = reconcile(
        EntityKind::Users,
        vec![ImportRow::new("U1", ImportAction::Create)
            .with_name("Dana")
            .with_field("email", text("dana@vendo.example"))],
        &snapshot,
    );

    assert!(!result.is_success());
    assert_eq!(kinds_of(&result.errors), vec![MessageKind::Found]);
    assert!(result.plan.is_empty());
}

#[test]
fn test_update_of_dead_entity_outside_resync_becomes_create() {
    let snapshot = Snapshot::new(vec![PersistedEntity::new(1, "R1", false)]);
    let result = reconcile(
        EntityKind::Regions,
        vec![region("R1", ImportAction::Update)],
        &snapshot,
    );

    assert!(result.is_success());
    assert_eq!(result.plan[0].action, ImportAction::Create);
    assert!(!result.plan[0].resurrect_entity);
}

// =============================================================================
// Full resync
// =============================================================================

#[test]
fn test_full_resync_synthesizes_delete() {
    let snapshot = Snapshot::new(vec![
        PersistedEntity::new(1, "M1", true),
        PersistedEntity::new(2, "M2", true),
    ])
    .with_references(machine_references());
    let result = reconcile(
        EntityKind::Machines,
        vec![machine("M1", ImportAction::Unknown)],
        &snapshot,
    );

    assert!(result.is_success(), "{:?}", result.errors);
    assert_eq!(result.plan.len(), 2);

    let deleted = result.planned("M2").unwrap();
    assert_eq!(deleted.action, ImportAction::Delete);
    assert!(deleted.action50_delete);
    assert_eq!(deleted.cloud_id, Some(EntityId::new(2)));
    assert_eq!(result.plan[0].external_id, "M2");

    assert_eq!(result.planned("M1").unwrap().action, ImportAction::Update);
    assert_eq!(result.summary.synthesized_deletes, 1);
}

#[test]
fn test_full_resync_resurrects_dead_entity() {
    let snapshot = Snapshot::new(vec![
        PersistedEntity::new(1, "R1", true),
        PersistedEntity::new(3, "R3", false),
    ]);
    let result = reconcile(
        EntityKind::Regions,
        vec![
            region("R1", ImportAction::Unknown),
            region("R3", ImportAction::Update),
            region("R4", ImportAction::Update),
        ],
        &snapshot,
    );

    assert!(result.is_success(), "{:?}", result.errors);
    let revived = result.planned("R3").unwrap();
    assert_eq!(revived.action, ImportAction::Update);
    assert!(revived.resurrect_entity);
    assert_eq!(result.planned("R4").unwrap().action, ImportAction::Create);
    assert_eq!(kinds_of(&result.warnings), vec![MessageKind::EntityResurrected]);
    assert_eq!(result.summary.resurrects, 1);
    assert_eq!(result.summary.creates, 1);
    assert_eq!(result.summary.updates, 1);
}

#[test]
fn test_full_resync_keeps_region_with_locations() {
    let snapshot = Snapshot::new(vec![
        PersistedEntity::new(1, "R1", true),
        PersistedEntity::new(2, "R2", true),
        PersistedEntity::new(3, "R3", true),
    ])
    .with_references(ReferenceData::new().with_set(
        ReferenceKind::Location,
        vec![dependent(50, "region_id", 2), dependent(51, "region_id", 2)],
    ));
    let result = reconcile(
        EntityKind::Regions,
        vec![region("R1", ImportAction::Unknown)],
        &snapshot,
    );

    assert!(result.is_success());
    assert!(result.planned("R2").is_none());
    assert_eq!(result.planned("R3").unwrap().action, ImportAction::Delete);

    assert_eq!(kinds_of(&result.warnings), vec![MessageKind::ResyncDeletionSkipped]);
    assert_eq!(result.warnings[0].args, vec!["location", "2"]);
    assert_eq!(
        result.warnings[0].record.as_ref().map(|r| r.external_id.as_str()),
        Some("R2")
    );
}

// =============================================================================
// Fail-fast checkpoints
// =============================================================================

#[test]
fn test_repeated_external_id_rejects_batch() {
    let result = reconcile(
        EntityKind::Regions,
        vec![
            region("R1", ImportAction::Create),
            ImportRow::new("R1", ImportAction::Create).with_name("Other"),
            ImportRow::new("R1", ImportAction::Delete),
        ],
        &Snapshot::default(),
    );

    assert!(!result.is_success());
    assert_eq!(
        kinds_of(&result.errors),
        vec![MessageKind::DuplicateExternalId, MessageKind::DuplicateExternalId]
    );
    let positions: Vec<_> = result
        .errors
        .iter()
        .filter_map(|e| e.record.as_ref().and_then(|r| r.position))
        .collect();
    assert_eq!(positions, vec![1, 2]);
    assert!(result.plan.is_empty());
}

#[test]
fn test_dedup_stops_before_mandatory_fields() {
    let result = reconcile(
        EntityKind::Machines,
        vec![
            ImportRow::new("M1", ImportAction::Create),
            ImportRow::new("M1", ImportAction::Create),
        ],
        &Snapshot::default(),
    );
    assert_eq!(kinds_of(&result.errors), vec![MessageKind::DuplicateExternalId]);
}

#[test]
fn test_repeated_name_rejects_batch_except_for_packings() {
    let result = reconcile(
        EntityKind::Clients,
        vec![
            ImportRow::new("C1", ImportAction::Create).with_name("Acme"),
            ImportRow::new("C2", ImportAction::Create).with_name("Acme"),
        ],
        &Snapshot::default(),
    );
    assert_eq!(kinds_of(&result.errors), vec![MessageKind::DuplicateName]);

    let snapshot = Snapshot::default().with_references(ReferenceData::new().with_set(
        ReferenceKind::Product,
        vec![alive_ref(1, "P1")],
    ));
    let result = reconcile(
        EntityKind::Packings,
        vec![
            ImportRow::new("K1", ImportAction::Create)
                .with_name("Box")
                .with_field("product_id", text("P1")),
            ImportRow::new("K2", ImportAction::Create)
                .with_name("Box")
                .with_field("product_id", text("P1")),
        ],
        &snapshot,
    );
    assert!(result.is_success(), "{:?}", result.errors);
}

#[test]
fn test_missing_mandatory_field_stops_before_references() {
    let snapshot = Snapshot::default().with_references(machine_references());
    let result = reconcile(
        EntityKind::Machines,
        vec![ImportRow::new("M1", ImportAction::Create)
            .with_name("Lobby")
            .with_field("machine_type_id", text("T404"))],
        &snapshot,
    );

    assert_eq!(kinds_of(&result.errors), vec![MessageKind::MissingMandatoryField]);
    assert_eq!(result.errors[0].arg(0), "location_id");
}

#[test]
fn test_errors_accumulate_across_row_checks() {
    let snapshot = Snapshot::new(vec![PersistedEntity::new(9, "M9", true).with_name("Taken")])
        .with_references(machine_references());
    let result = reconcile(
        EntityKind::Machines,
        vec![
            machine("M1", ImportAction::Delete),
            machine("M2", ImportAction::Create).with_field("location_id", text("L404")),
            machine("M3", ImportAction::Create).with_name("Taken"),
        ],
        &snapshot,
    );

    assert_eq!(
        kinds_of(&result.errors),
        vec![
            MessageKind::NotFound,
            MessageKind::ReferenceNotFound,
            MessageKind::ValueExistsInDatabase,
        ]
    );
}

// =============================================================================
// Row checks
// =============================================================================

#[test]
fn test_optional_reference_is_warning() {
    let result = reconcile(
        EntityKind::Locations,
        vec![ImportRow::new("L1", ImportAction::Create)
            .with_name("Station")
            .with_field("region_id", text("R404"))],
        &Snapshot::default(),
    );

    assert!(result.is_success());
    assert_eq!(kinds_of(&result.warnings), vec![MessageKind::ReferenceNotFound]);
    assert_eq!(result.plan.len(), 1);
}

#[test]
fn test_parent_region_in_same_batch() {
    let result = reconcile(
        EntityKind::Regions,
        vec![
            region("R2", ImportAction::Create).with_field("parent_region_id", text("R1")),
            region("R1", ImportAction::Create),
        ],
        &Snapshot::default(),
    );
    assert!(result.is_success());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_barcode_repeated_in_five_rows_reported_once() {
    let rows = (0..5)
        .map(|i| {
            ImportRow::new(format!("P{i}"), ImportAction::Create)
                .with_name(format!("Product {i}"))
                .with_field("barcode", text("4006381333931"))
        })
        .collect();
    let result = reconcile(EntityKind::Products, rows, &Snapshot::default());

    assert_eq!(kinds_of(&result.errors), vec![MessageKind::DuplicateValueInFile]);
    assert_eq!(result.errors[0].args, vec!["barcode", "4006381333931"]);
}

#[test]
fn test_protected_client_deletion_is_excluded() {
    let snapshot = Snapshot::new(vec![
        PersistedEntity::new(1, "C1", true),
        PersistedEntity::new(2, "C2", true),
    ])
    .with_references(ReferenceData::new().with_set(
        ReferenceKind::Machine,
        vec![dependent(70, "client_id", 1)],
    ));
    let result = reconcile(
        EntityKind::Clients,
        vec![
            ImportRow::new("C1", ImportAction::Delete),
            ImportRow::new("C2", ImportAction::Delete),
        ],
        &snapshot,
    );

    assert!(result.is_success(), "{:?}", result.errors);
    assert_eq!(kinds_of(&result.warnings), vec![MessageKind::ProtectedDeletion]);
    assert!(result.planned("C1").is_none());
    assert_eq!(result.planned("C2").unwrap().action, ImportAction::Delete);
    assert_eq!(result.summary.excluded, 1);
    assert_eq!(result.summary.deletes, 1);
}

fn cola(id: i64, external_id: &str) -> PersistedEntity {
    PersistedEntity::new(id, external_id, true)
        .with_name("Cola")
        .with_attribute("barcode", text("5449000000996"))
}

fn cola_row(external_id: &str, action: ImportAction) -> ImportRow {
    ImportRow::new(external_id, action)
        .with_name("Cola")
        .with_field("barcode", text("5449000000996"))
}

#[test]
fn test_excluded_deletion_keeps_unique_values_taken() {
    let snapshot = Snapshot::new(vec![cola(1, "P1")]).with_references(
        ReferenceData::new().with_set(
            ReferenceKind::MachineColumn,
            vec![dependent(80, "product_id", 1)],
        ),
    );
    let result = reconcile(
        EntityKind::Products,
        vec![
            ImportRow::new("P1", ImportAction::Delete),
            cola_row("P2", ImportAction::Create),
        ],
        &snapshot,
    );

    assert!(!result.is_success());
    assert!(result.plan.is_empty());
    assert_eq!(kinds_of(&result.warnings), vec![MessageKind::ProtectedDeletion]);
    assert_eq!(
        kinds_of(&result.errors),
        vec![MessageKind::ValueExistsInDatabase, MessageKind::ValueExistsInDatabase]
    );
    assert_eq!(result.errors[0].args, vec!["name", "Cola"]);
    assert_eq!(result.errors[1].args, vec!["barcode", "5449000000996"]);
}

#[test]
fn test_planned_deletion_releases_unique_values() {
    let result = reconcile(
        EntityKind::Products,
        vec![
            ImportRow::new("P1", ImportAction::Delete),
            cola_row("P2", ImportAction::Create),
        ],
        &Snapshot::new(vec![cola(1, "P1")]),
    );

    assert!(result.is_success(), "{:?}", result.errors);
    assert_eq!(result.planned("P1").unwrap().action, ImportAction::Delete);
    assert_eq!(result.planned("P2").unwrap().action, ImportAction::Create);
}

#[test]
fn test_update_without_barcode_keeps_it_taken() {
    let result = reconcile(
        EntityKind::Products,
        vec![
            ImportRow::new("P1", ImportAction::Update).with_name("Cola Zero"),
            ImportRow::new("P2", ImportAction::Create)
                .with_name("Cola Light")
                .with_field("barcode_2", text("5449000000996")),
        ],
        &Snapshot::new(vec![cola(1, "P1")]),
    );

    assert_eq!(kinds_of(&result.errors), vec![MessageKind::ValueExistsInDatabase]);
    assert_eq!(result.errors[0].args, vec!["barcode", "5449000000996"]);
    assert_eq!(
        result.errors[0].record.as_ref().map(|r| r.external_id.as_str()),
        Some("P2")
    );
}

#[test]
fn test_packing_on_planogram_cannot_be_deleted() {
    let snapshot = Snapshot::new(vec![PersistedEntity::new(4, "K4", true)]).with_references(
        ReferenceData::new().with_set(
            ReferenceKind::PlanogramItem,
            vec![dependent(80, "packing_id", 4)],
        ),
    );
    let result = reconcile(
        EntityKind::Packings,
        vec![ImportRow::new("K4", ImportAction::Delete)],
        &snapshot,
    );

    assert!(!result.is_success());
    assert_eq!(kinds_of(&result.errors), vec![MessageKind::ProtectedDeletion]);
    assert!(result.plan.is_empty());
}

#[test]
fn test_machine_meter_type() {
    let references = machine_references().with_set(
        ReferenceKind::MeterType,
        vec![ReferenceRecord::new(30, Some("CASH"), true)],
    );
    let rows = || {
        vec![machine("M1", ImportAction::Create).with_field("meter_type", text("CASH"))]
    };

    let enabled = Snapshot::default()
        .with_references(references.clone())
        .with_meters_enabled(true);
    let result = reconcile(EntityKind::Machines, rows(), &enabled);
    assert!(result.warnings.is_empty());
    assert_eq!(result.plan[0].resolved.get("meter_type"), Some(&EntityId::new(30)));

    let disabled = Snapshot::default().with_references(references);
    let result = reconcile(EntityKind::Machines, rows(), &disabled);
    assert_eq!(kinds_of(&result.warnings), vec![MessageKind::MeterSettingsDisabled]);
    assert!(!result.plan[0].fields.contains_key("meter_type"));
}

#[test]
fn test_user_email_checks() {
    let snapshot = Snapshot::new(vec![PersistedEntity::new(1, "U1", true)
        .with_attribute("email", FieldValue::Text("ops@vendo.example".to_string()))]);
    let result = reconcile(
        EntityKind::Users,
        vec![
            ImportRow::new("U2", ImportAction::Create)
                .with_name("Ana")
                .with_field("email", text("ops@vendo.example")),
            ImportRow::new("U3", ImportAction::Create)
                .with_name("Ben")
                .with_field("email", text("not-an-email")),
        ],
        &snapshot,
    );

    assert_eq!(
        kinds_of(&result.errors),
        vec![MessageKind::ValueExistsInDatabase, MessageKind::InvalidEmail]
    );
}
