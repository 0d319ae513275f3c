//! Per-company field uniqueness.

use std::collections::{HashMap, HashSet};

use crate::messages::{MessageKind, ValidationMessage, ValidationReport};
use crate::models::{Batch, ImportRow, PersistedEntity};

/// A value that must be unique per company. A group of columns (the three
/// barcode columns of a product) shares one value space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueField {
    /// Name used in messages.
    pub label: &'static str,
    pub columns: &'static [&'static str],
}

/// `(row index, value)` pairs of a field across the non-DELETE rows.
fn batch_values<'a>(batch: &'a Batch, field: &UniqueField) -> Vec<(usize, &'a ImportRow, String)> {
    batch
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.is_delete())
        .flat_map(|(index, row)| {
            field
                .columns
                .iter()
                .filter_map(move |column| row.value_key(column).map(|value| (index, row, value)))
        })
        .collect()
}

/// Persisted values of `field` that are still in place once the batch is
/// applied, with the external ids holding each one.
///
/// A persisted value is released only when its entity's row is a planned
/// DELETE or overwrites that exact column. Deletes left out of the plan
/// (`excluded`) release nothing.
fn retained_values<'a>(
    batch: &Batch,
    persisted: &'a [PersistedEntity],
    field: &UniqueField,
    excluded: &HashSet<String>,
) -> HashMap<String, HashSet<&'a str>> {
    let rows: HashMap<&str, &ImportRow> = batch
        .rows()
        .iter()
        .map(|row| (row.external_id.as_str(), row))
        .collect();

    let mut retained: HashMap<String, HashSet<&str>> = HashMap::new();
    for entity in persisted.iter().filter(|entity| entity.alive) {
        let row = rows.get(entity.external_id.as_str()).copied();
        if row.is_some_and(|row| row.is_delete() && !excluded.contains(&row.external_id)) {
            continue;
        }
        for column in field.columns {
            let overwritten =
                row.is_some_and(|row| !row.is_delete() && row.value_key(column).is_some());
            if overwritten {
                continue;
            }
            if let Some(value) = entity.value_key(column) {
                retained
                    .entry(value)
                    .or_default()
                    .insert(entity.external_id.as_str());
            }
        }
    }
    retained
}

/// Check one unique field across the batch and against the database.
///
/// In-file: a value carried by two or more distinct rows is an error.
/// Cross-database: a value that another alive entity still holds after the
/// batch is applied is an error. An entity may keep its own value or move it
/// between columns of the group. Each offending value is reported once per
/// check.
///
/// `excluded` holds the external ids of DELETE rows that will not be carried
/// out.
pub fn handle_field_uniqueness(
    batch: &Batch,
    persisted: &[PersistedEntity],
    field: &UniqueField,
    excluded: &HashSet<String>,
    report: &mut ValidationReport,
) {
    let pairs = batch_values(batch, field);

    let mut holders: HashMap<&str, HashSet<usize>> = HashMap::new();
    let mut reported_in_file = HashSet::new();
    for (index, row, value) in &pairs {
        let rows = holders.entry(value.as_str()).or_default();
        rows.insert(*index);
        if rows.len() > 1 && reported_in_file.insert(value.as_str()) {
            report.error(
                ValidationMessage::for_record(row.record(), MessageKind::DuplicateValueInFile)
                    .with_arg(field.label)
                    .with_arg(value),
            );
        }
    }

    let taken = retained_values(batch, persisted, field, excluded);
    if taken.is_empty() {
        return;
    }

    let mut reported_in_db = HashSet::new();
    for (_, row, value) in &pairs {
        let held_elsewhere = taken
            .get(value)
            .is_some_and(|owners| owners.iter().any(|owner| *owner != row.external_id));
        if held_elsewhere && reported_in_db.insert(value.as_str()) {
            report.error(
                ValidationMessage::for_record(row.record(), MessageKind::ValueExistsInDatabase)
                    .with_arg(field.label)
                    .with_arg(value),
            );
        }
    }
}
