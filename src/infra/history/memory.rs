//! In-memory metrics history for tests and dev.

use crate::core::metrics::TierSeed;
use crate::infra::history::MetricsHistory;

/// History source backed by a fixed in-memory seed list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    seeds: Vec<TierSeed>,
}

impl InMemoryHistory {
    /// Create a history source from pre-aggregated seeds.
    #[must_use]
    pub fn new(seeds: Vec<TierSeed>) -> Self {
        Self { seeds }
    }
}

impl MetricsHistory for InMemoryHistory {
    fn load(&self) -> Vec<TierSeed> {
        self.seeds.clone()
    }
}
