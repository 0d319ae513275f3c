//! Import reconciliation for the Vendo vending-management platform.
//!
//! This crate turns a batch of declared-action rows (machines, locations,
//! regions, clients, products, packings, planograms, users) plus a snapshot
//! of persisted entities into a validated action plan:
//! - Batch deduplication by external id and name
//! - Alive/dead classification and action normalization
//! - Full-resync ("action 50") expansion with synthesized deletes
//! - Referential, uniqueness and protected-deletion checks
//! - A per-company lease so runs for one company never interleave
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vendo_import::{ImportConfig, ImportService, InMemoryLeaseManager, PgSnapshotProvider};
//!
//! let service = ImportService::new(
//!     Arc::new(PgSnapshotProvider::new(pool)),
//!     Arc::new(InMemoryLeaseManager::new()),
//!     ImportConfig::from_env()?,
//! );
//! let run = service.reconcile(company_id, EntityKind::Machines, &rows).await?;
//! if run.is_success() {
//!     persist(run.result.plan);
//! }
//! ```

pub mod config;
pub mod error;
pub mod kinds;
pub mod messages;
pub mod models;
pub mod reconciliation;
pub mod services;
pub mod validation;

// Re-export public API
pub use config::ImportConfig;
pub use error::{ImportError, ImportResult};
pub use kinds::orchestrator_for;
pub use messages::{MessageKind, ValidationMessage, ValidationReport};
pub use models::{
    Batch, EntityKind, FieldValue, ImportAction, ImportRow, PersistedEntity, RawRow, RecordRef,
    ReferenceData, ReferenceKind, ReferenceRecord,
};
pub use reconciliation::{
    EntityOrchestrator, EntityProfile, PlanSummary, Snapshot, ValidationResult,
};
pub use services::{
    EnglishTranslator, ImportService, InMemoryLeaseManager, InMemorySnapshotProvider,
    LeaseManager, MessageTranslator, PgAdvisoryLeaseManager, PgSnapshotProvider,
    ReconciliationRun, SnapshotProvider,
};
