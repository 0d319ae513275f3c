//! Entity orchestrator.
//!
//! One implementation per entity kind. Each carries an [`EntityProfile`]
//! describing which shared checks apply and how; the checkpoint order lives
//! in [`run_pipeline`] and is the same for every kind.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vendo_core::CompanyAware;

use super::dedup::deduplicate;
use super::existence::{all_alive_ids, classify};
use super::normalizer::normalize_batch;
use super::report::ValidationResult;
use super::resync::expand;
use crate::messages::ValidationReport;
use crate::models::{Batch, EntityKind, ImportRow, PersistedEntity, ReferenceData, ReferenceKind};
use crate::validation::{
    check_action_existence, check_mandatory_fields, check_protected_deletions, check_references,
    deletion_guard, handle_field_uniqueness, CreatePolicy, ProtectionRule, ReferenceRule,
    UniqueField,
};

/// Static description of how one kind is reconciled.
#[derive(Debug, Clone, Copy)]
pub struct EntityProfile {
    pub kind: EntityKind,
    /// Dedupe by name as well as external id.
    pub check_names: bool,
    /// Columns every non-DELETE row must carry.
    pub mandatory_fields: &'static [&'static str],
    pub references: &'static [ReferenceRule],
    pub unique_fields: &'static [UniqueField],
    pub protections: &'static [ProtectionRule],
    pub create_policy: CreatePolicy,
    /// Reference sets needed only by kind-specific checks.
    pub extra_references: &'static [ReferenceKind],
    /// Kind-specific checks consult the company meter setting.
    pub uses_meter_settings: bool,
}

impl EntityProfile {
    /// Every reference set the snapshot must contain for this kind.
    #[must_use]
    pub fn reference_kinds(&self) -> BTreeSet<ReferenceKind> {
        self.references
            .iter()
            .map(|rule| rule.target)
            .chain(self.protections.iter().map(|rule| rule.dependent))
            .chain(self.extra_references.iter().copied())
            .collect()
    }
}

/// Read-only data one reconciliation runs against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every persisted entity of the batch's kind, alive and dead.
    pub persisted: Vec<PersistedEntity>,
    pub references: ReferenceData,
    #[serde(default)]
    pub meters_enabled: bool,
}

impl Snapshot {
    #[must_use]
    pub fn new(persisted: Vec<PersistedEntity>) -> Self {
        Self {
            persisted,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_references(mut self, references: ReferenceData) -> Self {
        self.references = references;
        self
    }

    #[must_use]
    pub fn with_meters_enabled(mut self, enabled: bool) -> Self {
        self.meters_enabled = enabled;
        self
    }
}

/// Reconciles batches of one entity kind.
pub trait EntityOrchestrator: Send + Sync {
    fn profile(&self) -> &EntityProfile;

    fn kind(&self) -> EntityKind {
        self.profile().kind
    }

    /// Checks that only this kind performs. Runs last, after the shared
    /// validators, on the normalized batch.
    fn kind_checks(
        &self,
        batch: Batch,
        _snapshot: &Snapshot,
        _report: &mut ValidationReport,
    ) -> Batch {
        batch
    }

    /// Turn a batch into a validated plan.
    fn reconcile(&self, batch: Batch, snapshot: &Snapshot) -> ValidationResult {
        run_pipeline(self, batch, snapshot)
    }
}

/// The fixed checkpoint sequence shared by every orchestrator.
pub fn run_pipeline<O>(orchestrator: &O, batch: Batch, snapshot: &Snapshot) -> ValidationResult
where
    O: EntityOrchestrator + ?Sized,
{
    let profile = orchestrator.profile();
    let company_id = batch.company_id();
    let kind = batch.kind();
    let mut report = ValidationReport::new();

    info!(
        company_id = %company_id,
        kind = %kind,
        rows = batch.len(),
        persisted = snapshot.persisted.len(),
        "Reconciling import batch"
    );

    let full_resync = batch.is_full_resync();

    let dedup = deduplicate(batch.rows().to_vec(), profile.check_names);
    if !dedup.is_clean() {
        report.extend_errors(dedup.messages());
        warn!(
            company_id = %company_id,
            kind = %kind,
            by_id = dedup.removed_by_id.len(),
            by_name = dedup.removed_by_name.len(),
            "Batch rejected: repeated rows"
        );
        return ValidationResult::failed(company_id, kind, report);
    }
    let batch = batch.with_rows(dedup.rows);

    check_mandatory_fields(&batch, profile.mandatory_fields, &mut report);
    if report.has_errors() {
        warn!(
            company_id = %company_id,
            kind = %kind,
            errors = report.errors.len(),
            "Batch rejected: missing mandatory fields"
        );
        return ValidationResult::failed(company_id, kind, report);
    }

    let mut existence = classify(&batch.external_ids(), &snapshot.persisted);
    debug!(
        alive = existence.alive_ids.len(),
        dead = existence.dead_ids.len(),
        "Classified batch"
    );

    // A full resync keeps its action-50 row, so expansion only comes back
    // empty for a batch without rows.
    let batch = if full_resync {
        let guard = deletion_guard(&snapshot.references, profile.protections);
        match expand(batch, &snapshot.persisted, &existence, guard) {
            Ok(outcome) => {
                report.extend_warnings(outcome.warnings);
                existence = outcome.existence;
                outcome.batch
            }
            Err(message) => {
                report.error(message);
                warn!(company_id = %company_id, kind = %kind, "Batch rejected: no entities remain");
                return ValidationResult::failed(company_id, kind, report);
            }
        }
    } else {
        batch
    };

    let batch = normalize_batch(batch, &existence);

    let all_alive = all_alive_ids(&snapshot.persisted);
    check_action_existence(
        &batch,
        &existence,
        &all_alive,
        profile.create_policy,
        &mut report,
    );
    let batch = check_references(batch, &snapshot.references, profile.references, &mut report);
    let excluded = check_protected_deletions(
        &batch,
        &snapshot.persisted,
        &snapshot.references,
        profile.protections,
        &mut report,
    );
    for field in profile.unique_fields {
        handle_field_uniqueness(&batch, &snapshot.persisted, field, &excluded, &mut report);
    }
    let batch = orchestrator.kind_checks(batch, snapshot, &mut report);

    if report.has_errors() {
        warn!(
            company_id = %company_id,
            kind = %kind,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Batch rejected"
        );
        return ValidationResult::failed(company_id, kind, report);
    }

    let plan = build_plan(batch, &excluded);
    let result =
        ValidationResult::accepted(company_id, kind, report.warnings, plan, excluded.len());

    info!(
        company_id = %company_id,
        kind = %kind,
        creates = result.summary.creates,
        updates = result.summary.updates,
        deletes = result.summary.deletes,
        resurrects = result.summary.resurrects,
        excluded = result.summary.excluded,
        warnings = result.warnings.len(),
        "Batch accepted"
    );

    result
}

fn build_plan(batch: Batch, excluded: &HashSet<String>) -> Vec<ImportRow> {
    batch
        .into_rows()
        .into_iter()
        .filter(|row| !excluded.contains(&row.external_id))
        .collect()
}
