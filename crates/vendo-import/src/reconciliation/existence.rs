//! Existence classification of a batch's external ids.

use std::collections::HashSet;

use crate::models::PersistedEntity;

/// Which of a batch's external ids are persisted alive, and which only as
/// soft-deleted records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistenceSets {
    pub alive_ids: HashSet<String>,
    /// Never overlaps `alive_ids`: an id with both an alive and a stale dead
    /// record counts as alive.
    pub dead_ids: HashSet<String>,
}

impl ExistenceSets {
    #[must_use]
    pub fn is_alive(&self, external_id: &str) -> bool {
        self.alive_ids.contains(external_id)
    }

    #[must_use]
    pub fn is_dead(&self, external_id: &str) -> bool {
        self.dead_ids.contains(external_id)
    }

    /// Persisted in any state.
    #[must_use]
    pub fn is_known(&self, external_id: &str) -> bool {
        self.is_alive(external_id) || self.is_dead(external_id)
    }
}

/// Partition the persisted entities matching `external_ids` by alive flag.
#[must_use]
pub fn classify(external_ids: &HashSet<String>, persisted: &[PersistedEntity]) -> ExistenceSets {
    let mut sets = ExistenceSets::default();

    for entity in persisted
        .iter()
        .filter(|entity| external_ids.contains(&entity.external_id))
    {
        if entity.alive {
            sets.alive_ids.insert(entity.external_id.clone());
        } else {
            sets.dead_ids.insert(entity.external_id.clone());
        }
    }

    let ExistenceSets { alive_ids, dead_ids } = sets;
    let dead_ids = dead_ids
        .into_iter()
        .filter(|id| !alive_ids.contains(id))
        .collect();

    ExistenceSets { alive_ids, dead_ids }
}

/// External ids of every alive persisted entity, regardless of the batch.
#[must_use]
pub fn all_alive_ids(persisted: &[PersistedEntity]) -> HashSet<String> {
    persisted
        .iter()
        .filter(|entity| entity.alive)
        .map(|entity| entity.external_id.clone())
        .collect()
}
