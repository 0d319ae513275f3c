//! PostgreSQL snapshot provider.
//!
//! Tables are expected to carry `id`, `company_id`, `external_id` and
//! `alive` columns; every other column is exposed as an attribute through
//! `to_jsonb`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use vendo_core::{CompanyId, EntityId};

use super::snapshot::SnapshotProvider;
use crate::error::{ImportError, ImportResult};
use crate::models::{
    attributes_from_json, EntityKind, FieldValue, PersistedEntity, ReferenceKind, ReferenceRecord,
};

/// Columns lifted out of the attribute map.
const LIFTED_COLUMNS: &[&str] = &["id", "company_id", "external_id", "name", "alive"];

type SnapshotRow = (i64, Option<String>, Option<String>, bool, Value);

/// Table backing an importable kind.
#[must_use]
pub fn entity_table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Machines => "machines",
        EntityKind::Locations => "locations",
        EntityKind::Regions => "regions",
        EntityKind::Clients => "clients",
        EntityKind::Products => "products",
        EntityKind::Packings => "packings",
        EntityKind::Planograms => "planograms",
        EntityKind::Users => "users",
    }
}

/// Table backing a reference kind.
#[must_use]
pub fn reference_table(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Region => "regions",
        ReferenceKind::Location => "locations",
        ReferenceKind::Client => "clients",
        ReferenceKind::ClientType => "client_types",
        ReferenceKind::Machine => "machines",
        ReferenceKind::MachineType => "machine_types",
        ReferenceKind::MachineCategory => "machine_categories",
        ReferenceKind::Warehouse => "warehouses",
        ReferenceKind::MeterType => "meter_types",
        ReferenceKind::Product => "products",
        ReferenceKind::Packing => "packings",
        ReferenceKind::Planogram => "planograms",
        ReferenceKind::PlanogramItem => "planogram_items",
        ReferenceKind::RotationGroupItem => "rotation_group_items",
        ReferenceKind::MachineColumn => "machine_columns",
    }
}

fn snapshot_query(table: &str) -> String {
    format!(
        "SELECT t.id, \
                to_jsonb(t)->>'external_id' AS external_id, \
                to_jsonb(t)->>'name' AS name, \
                COALESCE((to_jsonb(t)->>'alive')::boolean, TRUE) AS alive, \
                to_jsonb(t) AS attributes \
         FROM {table} t \
         WHERE t.company_id = $1"
    )
}

fn attributes(value: &Value) -> BTreeMap<String, FieldValue> {
    value
        .as_object()
        .map(|map| attributes_from_json(map, LIFTED_COLUMNS))
        .unwrap_or_default()
}

/// Snapshot provider over a Postgres pool. One query per call.
#[derive(Debug, Clone)]
pub struct PgSnapshotProvider {
    pool: PgPool,
}

impl PgSnapshotProvider {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(&self, table: &str, company_id: CompanyId) -> ImportResult<Vec<SnapshotRow>> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(&snapshot_query(table))
            .bind(company_id.as_i64())
            .fetch_all(&self.pool)
            .await?;

        debug!(company_id = %company_id, table = table, rows = rows.len(), "Fetched snapshot rows");
        Ok(rows)
    }
}

#[async_trait]
impl SnapshotProvider for PgSnapshotProvider {
    async fn fetch_persisted(
        &self,
        company_id: CompanyId,
        kind: EntityKind,
    ) -> ImportResult<Vec<PersistedEntity>> {
        let rows = self.fetch_rows(entity_table(kind), company_id).await?;

        // Rows without an external id were never imported and cannot match.
        Ok(rows
            .into_iter()
            .filter_map(|(id, external_id, name, alive, attrs)| {
                Some(PersistedEntity {
                    id: EntityId::new(id),
                    external_id: external_id?,
                    name,
                    alive,
                    attributes: attributes(&attrs),
                })
            })
            .collect())
    }

    async fn fetch_reference_set(
        &self,
        company_id: CompanyId,
        kind: ReferenceKind,
    ) -> ImportResult<Vec<ReferenceRecord>> {
        let rows = self
            .fetch_rows(reference_table(kind), company_id)
            .await
            .map_err(|err| match err {
                ImportError::Database(source) => ImportError::snapshot(kind, source.to_string()),
                other => other,
            })?;

        Ok(rows
            .into_iter()
            .map(|(id, external_id, _, alive, attrs)| ReferenceRecord {
                id: EntityId::new(id),
                external_id,
                alive,
                attributes: attributes(&attrs),
            })
            .collect())
    }

    async fn company_meter_settings(&self, company_id: CompanyId) -> ImportResult<bool> {
        let enabled = sqlx::query_scalar::<_, bool>(
            "SELECT COALESCE( \
                (SELECT meters_enabled FROM company_settings WHERE company_id = $1), \
                FALSE)",
        )
        .bind(company_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(enabled)
    }
}
