//! Full-resync ("action 50") expansion.
//!
//! A batch whose first row declares action 50 is the complete desired state
//! of the company. Every row is rewritten against the existence sets, and a
//! synthetic DELETE is prepended for each alive persisted entity the file no
//! longer mentions.

use std::collections::HashSet;

use tracing::debug;

use super::existence::{classify, ExistenceSets};
use crate::messages::{MessageKind, ValidationMessage};
use crate::models::{Batch, ImportAction, ImportRow, PersistedEntity};

/// Result of [`expand`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResyncOutcome {
    /// Synthesized deletes first, then the rewritten file rows.
    pub batch: Batch,
    /// Existence sets re-derived over the expanded batch.
    pub existence: ExistenceSets,
    /// Resurrection notices and deletions skipped by a guard.
    pub warnings: Vec<ValidationMessage>,
}

impl ResyncOutcome {
    /// Number of synthesized delete rows.
    #[must_use]
    pub fn synthesized_count(&self) -> usize {
        self.batch.rows().iter().filter(|r| r.action50_delete).count()
    }
}

/// Rewrite a file row against existence. Explicit deletes stay deletes.
fn rewrite_row(row: ImportRow, existence: &ExistenceSets) -> (ImportRow, Option<ValidationMessage>) {
    if row.declared_action == ImportAction::Delete {
        return (row, None);
    }
    if existence.is_alive(&row.external_id) {
        return (row.with_action(ImportAction::Update), None);
    }
    if existence.is_dead(&row.external_id) {
        let warning =
            ValidationMessage::for_record(row.record(), MessageKind::EntityResurrected);
        return (row.resurrecting(), Some(warning));
    }
    (row.with_action(ImportAction::Create), None)
}

/// Expand a full-resync batch.
///
/// `guard` inspects each alive persisted entity that would be deleted and
/// returns a warning when the entity must be kept; such entities get no
/// delete row. Returns a `NoEntitiesRemain` error when nothing is left.
pub fn expand<G>(
    batch: Batch,
    persisted: &[PersistedEntity],
    existence: &ExistenceSets,
    guard: G,
) -> Result<ResyncOutcome, ValidationMessage>
where
    G: Fn(&PersistedEntity) -> Option<ValidationMessage>,
{
    let in_file: HashSet<String> = batch.external_ids();
    let mut warnings = Vec::new();

    let mut synthesized = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for entity in persisted
        .iter()
        .filter(|entity| entity.alive && !in_file.contains(&entity.external_id))
    {
        if !seen.insert(entity.external_id.as_str()) {
            continue;
        }
        match guard(entity) {
            Some(warning) => warnings.push(warning),
            None => synthesized.push(ImportRow::synthesized_delete(entity)),
        }
    }

    let mut rows = synthesized;
    for row in batch.rows().iter().cloned() {
        let (row, warning) = rewrite_row(row, existence);
        warnings.extend(warning);
        rows.push(row);
    }

    debug!(
        rows = rows.len(),
        synthesized = rows.iter().filter(|r| r.action50_delete).count(),
        skipped = warnings
            .iter()
            .filter(|w| w.kind == MessageKind::ResyncDeletionSkipped)
            .count(),
        "Expanded full resync"
    );

    if rows.is_empty() {
        return Err(ValidationMessage::new(MessageKind::NoEntitiesRemain));
    }

    let batch = batch.with_rows(rows);
    let existence = classify(&batch.external_ids(), persisted);

    Ok(ResyncOutcome {
        batch,
        existence,
        warnings,
    })
}
