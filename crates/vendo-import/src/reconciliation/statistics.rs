//! Plan statistics.
//!
//! Counts what an accepted plan will do, for logging and for callers that
//! show a summary before persisting.

use serde::{Deserialize, Serialize};

use crate::models::{ImportAction, ImportRow};

/// Counts for one reconciliation plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Rows that insert a new entity.
    #[serde(default)]
    pub creates: u32,
    /// Rows that modify an alive entity (resurrections excluded).
    #[serde(default)]
    pub updates: u32,
    /// Rows that soft-delete, explicit or synthesized.
    #[serde(default)]
    pub deletes: u32,
    /// Rows that revive a soft-deleted entity.
    #[serde(default)]
    pub resurrects: u32,
    /// Deletes synthesized by a full resync (subset of `deletes`).
    #[serde(default)]
    pub synthesized_deletes: u32,
    /// Rows dropped from the plan by a warning-producing guard.
    #[serde(default)]
    pub excluded: u32,
}

impl PlanSummary {
    /// Create empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the rows of a plan.
    #[must_use]
    pub fn from_plan(plan: &[ImportRow], excluded: usize) -> Self {
        let mut summary = Self::new();
        for row in plan {
            summary.record(row);
        }
        summary.excluded = u32::try_from(excluded).unwrap_or(u32::MAX);
        summary
    }

    /// Record one planned row.
    pub fn record(&mut self, row: &ImportRow) {
        match row.action {
            ImportAction::Create => self.creates += 1,
            ImportAction::Update if row.resurrect_entity => self.resurrects += 1,
            ImportAction::Update => self.updates += 1,
            ImportAction::Delete => {
                self.deletes += 1;
                if row.action50_delete {
                    self.synthesized_deletes += 1;
                }
            }
            ImportAction::Unknown => {}
        }
    }

    /// Rows that reach persistence.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.creates + self.updates + self.deletes + self.resurrects
    }

    /// Merge with another summary.
    pub fn merge(&mut self, other: &PlanSummary) {
        self.creates += other.creates;
        self.updates += other.updates;
        self.deletes += other.deletes;
        self.resurrects += other.resurrects;
        self.synthesized_deletes += other.synthesized_deletes;
        self.excluded += other.excluded;
    }
}
