//! Batch deduplication.
//!
//! Keeps the first row per external id (and, optionally, per name) in input
//! order. Any removal rejects the whole batch; the caller turns the removed
//! rows into one error each and stops.

use std::collections::HashSet;

use crate::messages::{MessageKind, ValidationMessage};
use crate::models::ImportRow;

/// Result of [`deduplicate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    /// Rows that survived, in input order.
    pub rows: Vec<ImportRow>,
    /// Later rows repeating an earlier external id.
    pub removed_by_id: Vec<ImportRow>,
    /// Later rows repeating an earlier name (among rows that survived the
    /// id pass).
    pub removed_by_name: Vec<ImportRow>,
}

impl DedupOutcome {
    /// No row was removed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.removed_by_id.is_empty() && self.removed_by_name.is_empty()
    }

    /// One error per removed row.
    #[must_use]
    pub fn messages(&self) -> Vec<ValidationMessage> {
        let by_id = self.removed_by_id.iter().map(|row| {
            ValidationMessage::for_record(row.record(), MessageKind::DuplicateExternalId)
                .with_arg(&row.external_id)
        });
        let by_name = self.removed_by_name.iter().map(|row| {
            ValidationMessage::for_record(row.record(), MessageKind::DuplicateName)
                .with_arg(row.name.as_deref().unwrap_or_default())
        });
        by_id.chain(by_name).collect()
    }
}

/// Split `rows` into survivors and repeats. Rows without a name never
/// collide by name.
#[must_use]
pub fn deduplicate(rows: Vec<ImportRow>, check_names: bool) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();
    let mut seen_ids = HashSet::new();
    let mut by_id_survivors = Vec::with_capacity(rows.len());

    for row in rows {
        if seen_ids.insert(row.external_id.clone()) {
            by_id_survivors.push(row);
        } else {
            outcome.removed_by_id.push(row);
        }
    }

    if !check_names {
        outcome.rows = by_id_survivors;
        return outcome;
    }

    let mut seen_names = HashSet::new();
    for row in by_id_survivors {
        let repeated = row
            .name
            .as_ref()
            .is_some_and(|name| !seen_names.insert(name.clone()));
        if repeated {
            outcome.removed_by_name.push(row);
        } else {
            outcome.rows.push(row);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, ImportAction};
    use proptest::prelude::*;

    fn row(external_id: &str, name: &str, position: usize) -> ImportRow {
        ImportRow::new(external_id, ImportAction::Create)
            .with_name(name)
            .at_position(position)
    }

    #[test]
    fn test_clean_batch() {
        let outcome = deduplicate(vec![row("R1", "North", 0), row("R2", "South", 1)], true);
        assert!(outcome.is_clean());
        assert_eq!(outcome.rows.len(), 2);
        assert!(outcome.messages().is_empty());
    }

    #[test]
    fn test_repeated_id_keeps_first() {
        let outcome = deduplicate(
            vec![row("R1", "North", 0), row("R1", "Other", 1), row("R1", "Third", 2)],
            true,
        );
        assert!(!outcome.is_clean());
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].position, Some(0));
        assert_eq!(outcome.removed_by_id.len(), 2);

        let messages = outcome.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages
            .iter()
            .all(|m| m.kind == MessageKind::DuplicateExternalId && m.arg(0) == "R1"));
    }

    #[test]
    fn test_repeated_name() {
        let outcome = deduplicate(vec![row("R1", "North", 0), row("R2", "North", 1)], true);
        assert_eq!(outcome.removed_by_name.len(), 1);
        assert_eq!(outcome.removed_by_name[0].external_id, "R2");
        assert_eq!(outcome.messages()[0].kind, MessageKind::DuplicateName);
    }

    #[test]
    fn test_names_ignored_when_disabled() {
        let outcome = deduplicate(vec![row("P1", "Box", 0), row("P2", "Box", 1)], false);
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_missing_names_never_collide() {
        let outcome = deduplicate(
            vec![
                ImportRow::new("U1", ImportAction::Create),
                ImportRow::new("U2", ImportAction::Create),
            ],
            true,
        );
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_id_repeat_is_not_also_reported_as_name_repeat() {
        let outcome = deduplicate(vec![row("R1", "North", 0), row("R1", "North", 1)], true);
        assert_eq!(outcome.removed_by_id.len(), 1);
        assert!(outcome.removed_by_name.is_empty());
    }

    proptest! {
        #[test]
        fn prop_first_occurrence_wins(
            ids in proptest::collection::vec(0u8..6, 1..24),
            extra in proptest::collection::vec(any::<i64>(), 1..24),
        ) {
            let rows: Vec<ImportRow> = ids
                .iter()
                .enumerate()
                .map(|(position, id)| {
                    let mut row = ImportRow::new(format!("X{id}"), ImportAction::Update)
                        .at_position(position);
                    if let Some(value) = extra.get(position) {
                        row = row.with_field("payload", FieldValue::Int(*value));
                    }
                    row
                })
                .collect();

            let outcome = deduplicate(rows, false);

            let mut seen = HashSet::new();
            let expected: Vec<usize> = ids
                .iter()
                .enumerate()
                .filter(|(_, id)| seen.insert(**id))
                .map(|(position, _)| position)
                .collect();
            let kept: Vec<usize> = outcome.rows.iter().filter_map(|r| r.position).collect();
            prop_assert_eq!(kept, expected);
            prop_assert_eq!(outcome.rows.len() + outcome.removed_by_id.len(), ids.len());
        }
    }
}
