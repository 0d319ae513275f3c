//! # Import reconciliation
//!
//! Turns a declared-action batch plus a snapshot of persisted entities into
//! a validated action plan.
//!
//! ```text
//! raw batch
//!   -> dedup           (repeat id/name: reject batch)
//!   -> mandatory       (missing column: reject batch)
//!   -> classify        (alive / dead)
//!   -> resync expand   (action 50 only; re-classify)
//!   -> normalize       (UPDATE<->CREATE against alive set)
//!   -> row checks      (existence, references, protection, uniqueness, kind)
//!   -> plan
//! ```
//!
//! Everything here is synchronous and free of I/O; the snapshot is fetched by
//! [`crate::services::ImportService`] while it holds the company lease.

pub mod dedup;
pub mod existence;
pub mod normalizer;
pub mod orchestrator;
pub mod report;
pub mod resync;
pub mod statistics;

pub use dedup::{deduplicate, DedupOutcome};
pub use existence::{all_alive_ids, classify, ExistenceSets};
pub use normalizer::{normalize, normalize_batch};
pub use orchestrator::{run_pipeline, EntityOrchestrator, EntityProfile, Snapshot};
pub use report::ValidationResult;
pub use resync::{expand, ResyncOutcome};
pub use statistics::PlanSummary;
