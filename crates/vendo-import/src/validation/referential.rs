//! Referential integrity.

use std::collections::HashSet;

use crate::messages::{MessageKind, ValidationMessage, ValidationReport};
use crate::models::{Batch, ImportRow, ReferenceData, ReferenceKind};

/// A foreign-key column and the reference set it resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRule {
    pub column: &'static str,
    pub target: ReferenceKind,
    /// Unresolved required references are errors, optional ones warnings.
    pub required: bool,
    /// The value may name another (non-delete) row of the same batch, as a
    /// parent region created alongside its child does.
    pub allow_in_batch: bool,
}

impl ReferenceRule {
    #[must_use]
    pub const fn required(column: &'static str, target: ReferenceKind) -> Self {
        Self {
            column,
            target,
            required: true,
            allow_in_batch: false,
        }
    }

    #[must_use]
    pub const fn optional(column: &'static str, target: ReferenceKind) -> Self {
        Self {
            column,
            target,
            required: false,
            allow_in_batch: false,
        }
    }

    #[must_use]
    pub const fn within_batch(mut self) -> Self {
        self.allow_in_batch = true;
        self
    }
}

fn resolve_row(
    row: ImportRow,
    rules: &[ReferenceRule],
    references: &ReferenceData,
    batch_ids: &HashSet<String>,
    report: &mut ValidationReport,
) -> ImportRow {
    let mut row = row;
    for rule in rules {
        let Some(value) = row.value_key(rule.column) else {
            if rule.required {
                report.error(
                    ValidationMessage::for_record(row.record(), MessageKind::MissingReference)
                        .with_arg(rule.column),
                );
            }
            continue;
        };

        if let Some(record) = references.find_alive(rule.target, &value) {
            row = row.with_resolved(rule.column, record.id);
            continue;
        }

        if rule.allow_in_batch && value != row.external_id && batch_ids.contains(&value) {
            continue;
        }

        let message = ValidationMessage::for_record(row.record(), MessageKind::ReferenceNotFound)
            .with_arg(rule.column)
            .with_arg(&value)
            .with_arg(rule.target);
        if rule.required {
            report.error(message);
        } else {
            report.warn(message);
        }
    }
    row
}

/// Resolve every reference column of every non-DELETE row.
///
/// Resolved ids are written to [`ImportRow::resolved`]; references satisfied
/// by another row of the batch stay unresolved for the persistence layer to
/// fill in.
#[must_use]
pub fn check_references(
    batch: Batch,
    references: &ReferenceData,
    rules: &[ReferenceRule],
    report: &mut ValidationReport,
) -> Batch {
    if rules.is_empty() {
        return batch;
    }

    let batch_ids: HashSet<String> = batch
        .rows()
        .iter()
        .filter(|row| !row.is_delete())
        .map(|row| row.external_id.clone())
        .collect();

    batch.map_rows(|row| {
        if row.is_delete() {
            row
        } else {
            resolve_row(row, rules, references, &batch_ids, report)
        }
    })
}
