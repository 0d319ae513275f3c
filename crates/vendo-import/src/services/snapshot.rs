//! Snapshot providers.
//!
//! The engine reads persisted state only through [`SnapshotProvider`]. A
//! provider must return every entity of a kind regardless of its alive flag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;
use vendo_core::CompanyId;

use crate::error::{ImportError, ImportResult};
use crate::models::{EntityKind, PersistedEntity, ReferenceData, ReferenceKind, ReferenceRecord};
use crate::reconciliation::{EntityProfile, Snapshot};

/// Read access to persisted state, scoped by company.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Every persisted entity of `kind`, alive and dead.
    async fn fetch_persisted(
        &self,
        company_id: CompanyId,
        kind: EntityKind,
    ) -> ImportResult<Vec<PersistedEntity>>;

    /// Every record of a reference or dependent kind, alive and dead.
    async fn fetch_reference_set(
        &self,
        company_id: CompanyId,
        kind: ReferenceKind,
    ) -> ImportResult<Vec<ReferenceRecord>>;

    /// Whether the company tracks meters.
    async fn company_meter_settings(&self, company_id: CompanyId) -> ImportResult<bool>;
}

/// Fetch everything `profile` needs: one persisted query, one query per
/// reference kind and the meter setting when the kind uses it.
pub async fn load_snapshot(
    provider: &dyn SnapshotProvider,
    company_id: CompanyId,
    profile: &EntityProfile,
) -> ImportResult<Snapshot> {
    let persisted = provider.fetch_persisted(company_id, profile.kind).await?;

    let mut references = ReferenceData::new();
    for kind in profile.reference_kinds() {
        let records = provider.fetch_reference_set(company_id, kind).await?;
        references.insert(kind, records);
    }

    let meters_enabled = if profile.uses_meter_settings {
        provider.company_meter_settings(company_id).await?
    } else {
        false
    };

    debug!(
        company_id = %company_id,
        kind = %profile.kind,
        persisted = persisted.len(),
        reference_sets = profile.reference_kinds().len(),
        meters_enabled,
        "Loaded snapshot"
    );

    Ok(Snapshot::new(persisted)
        .with_references(references)
        .with_meters_enabled(meters_enabled))
}

/// Process-local provider for tests and embedders that already hold the
/// data in memory.
#[derive(Debug, Default)]
pub struct InMemorySnapshotProvider {
    persisted: HashMap<(CompanyId, EntityKind), Vec<PersistedEntity>>,
    references: HashMap<(CompanyId, ReferenceKind), Vec<ReferenceRecord>>,
    meters: HashMap<CompanyId, bool>,
    failing: Option<ReferenceKind>,
    persisted_fetches: AtomicUsize,
}

impl InMemorySnapshotProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_persisted(
        mut self,
        company_id: CompanyId,
        kind: EntityKind,
        entities: Vec<PersistedEntity>,
    ) -> Self {
        self.persisted.insert((company_id, kind), entities);
        self
    }

    #[must_use]
    pub fn with_reference_set(
        mut self,
        company_id: CompanyId,
        kind: ReferenceKind,
        records: Vec<ReferenceRecord>,
    ) -> Self {
        self.references.insert((company_id, kind), records);
        self
    }

    #[must_use]
    pub fn with_meter_settings(mut self, company_id: CompanyId, enabled: bool) -> Self {
        self.meters.insert(company_id, enabled);
        self
    }

    /// Make fetches of one reference kind fail.
    #[must_use]
    pub fn failing_on(mut self, kind: ReferenceKind) -> Self {
        self.failing = Some(kind);
        self
    }

    /// Number of `fetch_persisted` calls served so far.
    #[must_use]
    pub fn persisted_fetch_count(&self) -> usize {
        self.persisted_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotProvider for InMemorySnapshotProvider {
    async fn fetch_persisted(
        &self,
        company_id: CompanyId,
        kind: EntityKind,
    ) -> ImportResult<Vec<PersistedEntity>> {
        self.persisted_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .persisted
            .get(&(company_id, kind))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_reference_set(
        &self,
        company_id: CompanyId,
        kind: ReferenceKind,
    ) -> ImportResult<Vec<ReferenceRecord>> {
        if self.failing == Some(kind) {
            return Err(ImportError::snapshot(kind, "reference set unavailable"));
        }
        Ok(self
            .references
            .get(&(company_id, kind))
            .cloned()
            .unwrap_or_default())
    }

    async fn company_meter_settings(&self, company_id: CompanyId) -> ImportResult<bool> {
        Ok(self.meters.get(&company_id).copied().unwrap_or(false))
    }
}
