//! Mandatory-field check.

use crate::messages::{MessageKind, ValidationMessage, ValidationReport};
use crate::models::Batch;

/// Report every non-DELETE row missing one of `fields`. Deletes only need
/// their external id.
pub fn check_mandatory_fields(batch: &Batch, fields: &[&str], report: &mut ValidationReport) {
    for row in batch.rows().iter().filter(|row| !row.is_delete()) {
        for field in fields {
            if row.value_key(field).is_none() {
                report.error(
                    ValidationMessage::for_record(row.record(), MessageKind::MissingMandatoryField)
                        .with_arg(field),
                );
            }
        }
    }
}
