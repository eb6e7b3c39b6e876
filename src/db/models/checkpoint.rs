use chrono::{DateTime, Utc};

/// Ingestion progress checkpoint.
///
/// Single row: the highest block number whose entire per-block transaction
/// has committed. `updated_at` doubles as a liveness heartbeat.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub block_number: u64,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(block_number: u64) -> Self {
        Self {
            block_number,
            updated_at: Utc::now(),
        }
    }
}
