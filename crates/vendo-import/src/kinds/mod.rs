//! Per-kind orchestrators.

mod clients;
mod locations;
mod machines;
mod packings;
mod planograms;
mod products;
mod regions;
mod users;

pub use clients::ClientOrchestrator;
pub use locations::LocationOrchestrator;
pub use machines::MachineOrchestrator;
pub use packings::PackingOrchestrator;
pub use planograms::PlanogramOrchestrator;
pub use products::ProductOrchestrator;
pub use regions::RegionOrchestrator;
pub use users::UserOrchestrator;

use crate::models::EntityKind;
use crate::reconciliation::EntityOrchestrator;

/// Orchestrator for an entity kind.
#[must_use]
pub fn orchestrator_for(kind: EntityKind) -> Box<dyn EntityOrchestrator> {
    match kind {
        EntityKind::Machines => Box::new(MachineOrchestrator),
        EntityKind::Locations => Box::new(LocationOrchestrator),
        EntityKind::Regions => Box::new(RegionOrchestrator),
        EntityKind::Clients => Box::new(ClientOrchestrator),
        EntityKind::Products => Box::new(ProductOrchestrator),
        EntityKind::Packings => Box::new(PackingOrchestrator),
        EntityKind::Planograms => Box::new(PlanogramOrchestrator),
        EntityKind::Users => Box::new(UserOrchestrator),
    }
}
