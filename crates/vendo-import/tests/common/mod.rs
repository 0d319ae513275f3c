//! Shared helpers for vendo-import integration tests.

#![allow(dead_code)]

use std::sync::Once;

use serde_json::{json, Value};
use vendo_core::CompanyId;
use vendo_import::{
    Batch, EntityKind, FieldValue, ImportAction, ImportRow, RawRow, ReferenceRecord,
};

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub const COMPANY: CompanyId = CompanyId::new(100);

pub fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

pub fn batch(kind: EntityKind, rows: Vec<ImportRow>) -> Batch {
    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(position, row)| row.at_position(position))
        .collect();
    Batch::new(COMPANY, kind, rows)
}

/// A machine row with every mandatory column set.
pub fn machine(external_id: &str, action: ImportAction) -> ImportRow {
    ImportRow::new(external_id, action)
        .with_name(format!("Machine {external_id}"))
        .with_field("location_id", text("L1"))
        .with_field("machine_type_id", text("T1"))
}

pub fn region(external_id: &str, action: ImportAction) -> ImportRow {
    ImportRow::new(external_id, action).with_name(format!("Region {external_id}"))
}

pub fn alive_ref(id: i64, external_id: &str) -> ReferenceRecord {
    ReferenceRecord::new(id, Some(external_id), true)
}

/// A dependent record pointing at `target` through `column`.
pub fn dependent(id: i64, column: &str, target: i64) -> ReferenceRecord {
    ReferenceRecord::new(id, None, true).with_attribute(column, FieldValue::Int(target))
}

pub fn raw(value: Value) -> RawRow {
    value.as_object().cloned().unwrap_or_default()
}

pub fn raw_machine(external_id: &str, action: Value) -> RawRow {
    raw(json!({
        "external_id": external_id,
        "name": format!("Machine {external_id}"),
        "action": action,
        "location_id": "L1",
        "machine_type_id": "T1",
        "warehouse_id": "<null>"
    }))
}
