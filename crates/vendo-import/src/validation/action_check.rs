//! Action existence check.
//!
//! Runs after normalization, so for well-formed batches it only fires on
//! deletes of unknown entities, leftover action-50 rows and the
//! reject-existing policy.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::messages::{MessageKind, ValidationMessage, ValidationReport};
use crate::models::{Batch, ImportAction, ImportRow};
use crate::reconciliation::existence::ExistenceSets;

/// How a kind treats a declared CREATE of an entity that is already alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// The normalizer turns it into an UPDATE.
    #[default]
    UpgradeToUpdate,
    /// Reported as `Found`.
    RejectExisting,
}

fn not_found(row: &ImportRow) -> ValidationMessage {
    ValidationMessage::for_record(row.record(), MessageKind::NotFound).with_arg(row.action)
}

/// Check each row's effective action against what is persisted.
///
/// `all_alive` is every alive persisted external id of the kind, not just
/// those mentioned in the batch.
pub fn check_action_existence(
    batch: &Batch,
    existence: &ExistenceSets,
    all_alive: &HashSet<String>,
    policy: CreatePolicy,
    report: &mut ValidationReport,
) {
    for row in batch.rows() {
        let id = row.external_id.as_str();
        match row.action {
            ImportAction::Update if row.resurrect_entity => {
                if !existence.is_alive(id) && !existence.is_dead(id) {
                    report.error(not_found(row));
                }
            }
            ImportAction::Update => {
                if !existence.is_alive(id) {
                    report.error(not_found(row));
                }
            }
            ImportAction::Delete => {
                if !all_alive.contains(id) {
                    report.error(not_found(row));
                }
            }
            ImportAction::Create => {
                if all_alive.contains(id) {
                    report.error(ValidationMessage::for_record(row.record(), MessageKind::Found));
                }
            }
            ImportAction::Unknown => {
                report.error(
                    ValidationMessage::for_record(row.record(), MessageKind::InvalidAction)
                        .with_arg(ImportAction::Unknown.code()),
                );
            }
        }

        let rejected_create = policy == CreatePolicy::RejectExisting
            && row.declared_action == ImportAction::Create
            && row.action != ImportAction::Create
            && all_alive.contains(id);
        if rejected_create {
            report.error(ValidationMessage::for_record(row.record(), MessageKind::Found));
        }
    }
}
