//! Services around the reconciliation engine.

pub mod import_service;
pub mod lease;
pub mod pg_lease;
pub mod pg_snapshot;
pub mod snapshot;
pub mod translator;

pub use import_service::{fingerprint, ImportService, ReconciliationRun};
pub use lease::{acquire_lease, InMemoryLeaseManager, LeaseManager, LeaseToken};
pub use pg_lease::PgAdvisoryLeaseManager;
pub use pg_snapshot::PgSnapshotProvider;
pub use snapshot::{load_snapshot, InMemorySnapshotProvider, SnapshotProvider};
pub use translator::{EnglishTranslator, MessageTranslator};
