//! Durable history sources used to seed the metrics tracker at startup.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryHistory;
pub use postgres::PostgresHistory;

use crate::core::metrics::TierSeed;

/// Optional persistence collaborator for processing metrics.
///
/// The scheduler works without one: construction falls back to the hardcoded
/// per-tier defaults when no history is wired in or loading fails.
pub trait MetricsHistory: Send + Sync {
    /// Load historical per-tier observations, most recent aggregate per tier.
    fn load(&self) -> Vec<TierSeed>;
}
