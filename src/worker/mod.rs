mod enricher;
mod poller;
mod reorg;

pub use enricher::enrich_block;
pub use poller::{Health, HealthSnapshot, Poller};
pub use reorg::{ReorgController, ReorgDecision};
