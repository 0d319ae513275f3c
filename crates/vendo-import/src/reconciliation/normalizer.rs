//! Declared-action normalization.

use std::collections::HashSet;

use super::existence::ExistenceSets;
use crate::models::{Batch, ImportAction};

/// Reconcile a declared action with what is actually persisted alive.
///
/// UPDATE of a missing entity becomes CREATE; CREATE of an alive entity
/// becomes UPDATE; everything else passes through. Idempotent.
#[must_use]
pub fn normalize(
    declared: ImportAction,
    external_id: &str,
    alive_ids: &HashSet<String>,
) -> ImportAction {
    match declared {
        ImportAction::Update if !alive_ids.contains(external_id) => ImportAction::Create,
        ImportAction::Create if alive_ids.contains(external_id) => ImportAction::Update,
        other => other,
    }
}

/// Normalize every user-declared row. Synthesized deletes and resurrecting
/// updates are left alone.
#[must_use]
pub fn normalize_batch(batch: Batch, existence: &ExistenceSets) -> Batch {
    batch.map_rows(|row| {
        if row.action50_delete || row.resurrect_entity {
            return row;
        }
        let action = normalize(row.action, &row.external_id, &existence.alive_ids);
        row.with_action(action)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, ImportRow, PersistedEntity};
    use proptest::prelude::*;
    use vendo_core::CompanyId;

    fn alive(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_update_of_missing_becomes_create() {
        assert_eq!(
            normalize(ImportAction::Update, "M1", &alive(&[])),
            ImportAction::Create
        );
    }

    #[test]
    fn test_create_of_alive_becomes_update() {
        assert_eq!(
            normalize(ImportAction::Create, "M1", &alive(&["M1"])),
            ImportAction::Update
        );
    }

    #[test]
    fn test_delete_and_unknown_pass_through() {
        let set = alive(&["M1"]);
        assert_eq!(normalize(ImportAction::Delete, "M1", &set), ImportAction::Delete);
        assert_eq!(normalize(ImportAction::Delete, "M2", &set), ImportAction::Delete);
        assert_eq!(normalize(ImportAction::Unknown, "M1", &set), ImportAction::Unknown);
    }

    #[test]
    fn test_normalize_batch_skips_synthesized_rows() {
        let synthesized = ImportRow::synthesized_delete(&PersistedEntity::new(4, "M4", true));
        let resurrect = ImportRow::new("M5", ImportAction::Unknown).resurrecting();
        let batch = Batch::new(
            CompanyId::new(1),
            EntityKind::Machines,
            vec![
                ImportRow::new("M1", ImportAction::Update),
                synthesized,
                resurrect,
            ],
        );
        let existence = ExistenceSets::default();

        let normalized = normalize_batch(batch, &existence);
        let actions: Vec<_> = normalized.rows().iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![ImportAction::Create, ImportAction::Delete, ImportAction::Update]
        );
        assert_eq!(normalized.rows()[0].declared_action, ImportAction::Update);
    }

    fn any_action() -> impl Strategy<Value = ImportAction> {
        prop_oneof![
            Just(ImportAction::Create),
            Just(ImportAction::Update),
            Just(ImportAction::Delete),
            Just(ImportAction::Unknown),
        ]
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            action in any_action(),
            id in 0u8..8,
            alive_ids in proptest::collection::hash_set(0u8..8, 0..8),
        ) {
            let alive: HashSet<String> = alive_ids.iter().map(|i| format!("E{i}")).collect();
            let external_id = format!("E{id}");
            let once = normalize(action, &external_id, &alive);
            let twice = normalize(once, &external_id, &alive);
            prop_assert_eq!(once, twice);
        }
    }
}
