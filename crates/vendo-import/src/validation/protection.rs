//! Protected deletions.
//!
//! An entity still referenced by alive dependents cannot be deleted. Soft
//! rules drop the delete row from the plan with a warning; hard rules fail
//! the batch. During a full resync every rule only skips the synthesized
//! delete.

use std::collections::HashSet;

use vendo_core::EntityId;

use crate::messages::{MessageKind, ValidationMessage, ValidationReport};
use crate::models::{Batch, ImportRow, PersistedEntity, ReferenceData, ReferenceKind};

/// A dependent table whose `foreign_key` column points at the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectionRule {
    pub dependent: ReferenceKind,
    pub foreign_key: &'static str,
    pub hard: bool,
}

impl ProtectionRule {
    #[must_use]
    pub const fn soft(dependent: ReferenceKind, foreign_key: &'static str) -> Self {
        Self {
            dependent,
            foreign_key,
            hard: false,
        }
    }

    #[must_use]
    pub const fn hard(dependent: ReferenceKind, foreign_key: &'static str) -> Self {
        Self {
            dependent,
            foreign_key,
            hard: true,
        }
    }
}

/// Rules blocking deletion of `target`, hard rules first, with dependent
/// counts.
fn blocking_rules<'a>(
    target: EntityId,
    references: &ReferenceData,
    rules: &'a [ProtectionRule],
) -> Vec<(&'a ProtectionRule, usize)> {
    let mut blocking: Vec<_> = rules
        .iter()
        .map(|rule| {
            let count = references.count_dependents(rule.dependent, rule.foreign_key, target);
            (rule, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();
    blocking.sort_by_key(|(rule, _)| !rule.hard);
    blocking
}

/// Guard for full-resync expansion: returns a `ResyncDeletionSkipped`
/// warning for entities that still have dependents.
pub fn deletion_guard<'a>(
    references: &'a ReferenceData,
    rules: &'a [ProtectionRule],
) -> impl Fn(&PersistedEntity) -> Option<ValidationMessage> + 'a {
    move |entity| {
        let (rule, count) = blocking_rules(entity.id, references, rules).into_iter().next()?;
        let record = ImportRow::synthesized_delete(entity).record();
        Some(
            ValidationMessage::for_record(record, MessageKind::ResyncDeletionSkipped)
                .with_arg(rule.dependent)
                .with_arg(count),
        )
    }
}

fn target_id(row: &ImportRow, persisted: &[PersistedEntity]) -> Option<EntityId> {
    row.cloud_id.or_else(|| {
        persisted
            .iter()
            .find(|entity| entity.alive && entity.external_id == row.external_id)
            .map(|entity| entity.id)
    })
}

/// Check every explicit DELETE row. Returns the external ids of rows that
/// must be left out of the plan.
#[must_use]
pub fn check_protected_deletions(
    batch: &Batch,
    persisted: &[PersistedEntity],
    references: &ReferenceData,
    rules: &[ProtectionRule],
    report: &mut ValidationReport,
) -> HashSet<String> {
    let mut excluded = HashSet::new();
    if rules.is_empty() {
        return excluded;
    }

    for row in batch
        .rows()
        .iter()
        .filter(|row| row.is_delete() && !row.action50_delete)
    {
        let Some(target) = target_id(row, persisted) else {
            continue;
        };
        let Some((rule, count)) = blocking_rules(target, references, rules).into_iter().next()
        else {
            continue;
        };

        let message = ValidationMessage::for_record(row.record(), MessageKind::ProtectedDeletion)
            .with_arg(rule.dependent)
            .with_arg(count);
        if rule.hard {
            report.error(message);
        } else {
            report.warn(message);
            excluded.insert(row.external_id.clone());
        }
    }

    excluded
}
