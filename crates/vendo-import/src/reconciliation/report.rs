//! Reconciliation result.

use serde::{Deserialize, Serialize};
use vendo_core::{CompanyAware, CompanyId};

use super::statistics::PlanSummary;
use crate::messages::{ValidationMessage, ValidationReport};
use crate::models::{EntityKind, ImportRow};

/// Outcome of reconciling one batch.
///
/// `errors` non-empty means nothing may be persisted, and `plan` is empty.
/// Otherwise `plan` is the ordered list of rows for the persistence
/// collaborator, and `warnings` must still be shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub company_id: CompanyId,
    pub kind: EntityKind,
    #[serde(default)]
    pub errors: Vec<ValidationMessage>,
    #[serde(default)]
    pub warnings: Vec<ValidationMessage>,
    #[serde(default)]
    pub plan: Vec<ImportRow>,
    #[serde(default)]
    pub summary: PlanSummary,
}

impl ValidationResult {
    /// A rejected batch. Warnings gathered before the failing checkpoint are
    /// kept.
    #[must_use]
    pub fn failed(company_id: CompanyId, kind: EntityKind, report: ValidationReport) -> Self {
        Self {
            company_id,
            kind,
            errors: report.errors,
            warnings: report.warnings,
            plan: Vec::new(),
            summary: PlanSummary::default(),
        }
    }

    /// An accepted batch.
    #[must_use]
    pub fn accepted(
        company_id: CompanyId,
        kind: EntityKind,
        warnings: Vec<ValidationMessage>,
        plan: Vec<ImportRow>,
        excluded: usize,
    ) -> Self {
        let summary = PlanSummary::from_plan(&plan, excluded);
        Self {
            company_id,
            kind,
            errors: Vec::new(),
            warnings,
            plan,
            summary,
        }
    }

    /// Whether the batch may be persisted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Planned row for an external id.
    #[must_use]
    pub fn planned(&self, external_id: &str) -> Option<&ImportRow> {
        self.plan.iter().find(|row| row.external_id == external_id)
    }
}

impl CompanyAware for ValidationResult {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}
