//! Import service.
//!
//! Wraps the synchronous engine with the company lease and the snapshot
//! fetch: size check, lease, snapshot, orchestrator, release.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};
use vendo_core::{CompanyAware, CompanyId, VendoError};

use super::lease::{acquire_lease, LeaseManager};
use super::snapshot::{load_snapshot, SnapshotProvider};
use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::kinds::orchestrator_for;
use crate::messages::ValidationReport;
use crate::models::{Batch, EntityKind, RawRow};
use crate::reconciliation::{EntityOrchestrator, ValidationResult};

/// One finished reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRun {
    pub company_id: CompanyId,
    pub kind: EntityKind,
    /// SHA-256 of the submitted rows, hex encoded.
    pub batch_fingerprint: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub result: ValidationResult,
}

impl ReconciliationRun {
    fn finish(
        started_at: DateTime<Utc>,
        batch_fingerprint: String,
        result: ValidationResult,
    ) -> Self {
        Self {
            company_id: result.company_id,
            kind: result.kind,
            batch_fingerprint,
            started_at,
            completed_at: Utc::now(),
            result,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// SHA-256 of a value's JSON form.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> ImportResult<String> {
    let bytes = serde_json::to_vec(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Runs reconciliations, one per company at a time.
#[derive(Clone)]
pub struct ImportService {
    provider: Arc<dyn SnapshotProvider>,
    leases: Arc<dyn LeaseManager>,
    config: ImportConfig,
}

impl ImportService {
    pub fn new(
        provider: Arc<dyn SnapshotProvider>,
        leases: Arc<dyn LeaseManager>,
        config: ImportConfig,
    ) -> Self {
        Self {
            provider,
            leases,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn check_size(&self, rows: usize) -> ImportResult<()> {
        if rows > self.config.max_rows {
            return Err(ImportError::TooManyRows(format!(
                "Batch contains {rows} rows, maximum allowed is {}",
                self.config.max_rows
            )));
        }
        Ok(())
    }

    /// Reconcile raw rows. Malformed rows fail the run without taking the
    /// lease.
    pub async fn reconcile(
        &self,
        company_id: CompanyId,
        kind: EntityKind,
        raw_rows: &[RawRow],
    ) -> ImportResult<ReconciliationRun> {
        self.check_size(raw_rows.len())?;

        match Batch::from_raw(company_id, kind, raw_rows) {
            Ok(batch) => self.reconcile_batch(company_id, batch).await,
            Err(problems) => {
                let started_at = Utc::now();
                warn!(
                    company_id = %company_id,
                    kind = %kind,
                    errors = problems.len(),
                    "Batch rejected: malformed rows"
                );
                let mut report = ValidationReport::new();
                report.extend_errors(problems);
                let result = ValidationResult::failed(company_id, kind, report);
                Ok(ReconciliationRun::finish(
                    started_at,
                    fingerprint(raw_rows)?,
                    result,
                ))
            }
        }
    }

    /// Reconcile an already-typed batch.
    pub async fn reconcile_batch(
        &self,
        company_id: CompanyId,
        batch: Batch,
    ) -> ImportResult<ReconciliationRun> {
        if !batch.belongs_to(company_id) {
            return Err(VendoError::CompanyMismatch {
                expected: company_id,
                actual: batch.company_id(),
            }
            .into());
        }
        self.check_size(batch.len())?;

        let started_at = Utc::now();
        let batch_fingerprint = fingerprint(batch.rows())?;
        let orchestrator = orchestrator_for(batch.kind());

        let lease = acquire_lease(
            self.leases.as_ref(),
            company_id,
            self.config.lease_poll_interval(),
        )
        .await?;

        let outcome = self.run_locked(company_id, batch, orchestrator.as_ref()).await;

        if let Err(err) = self.leases.release(lease).await {
            error!(company_id = %company_id, error = %err, "Failed to release company lease");
        }

        let result = outcome?;
        let run = ReconciliationRun::finish(started_at, batch_fingerprint, result);

        info!(
            company_id = %company_id,
            kind = %run.kind,
            success = run.is_success(),
            fingerprint = %run.batch_fingerprint,
            duration_ms = (run.completed_at - run.started_at).num_milliseconds(),
            "Reconciliation run finished"
        );

        Ok(run)
    }

    async fn run_locked(
        &self,
        company_id: CompanyId,
        batch: Batch,
        orchestrator: &dyn EntityOrchestrator,
    ) -> ImportResult<ValidationResult> {
        let snapshot =
            load_snapshot(self.provider.as_ref(), company_id, orchestrator.profile()).await?;
        Ok(orchestrator.reconcile(batch, &snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = fingerprint(&vec!["M1", "M2"]).unwrap();
        let b = fingerprint(&vec!["M1", "M2"]).unwrap();
        let c = fingerprint(&vec!["M2", "M1"]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
