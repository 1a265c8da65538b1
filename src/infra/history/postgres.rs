//! Postgres-backed metrics history (schema-only; DB I/O not wired).

use crate::core::metrics::TierSeed;
use crate::infra::history::MetricsHistory;

/// Postgres history source. Holds the schema contract; actual reads require
/// a runtime and client and are left to the integration layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresHistory;

impl PostgresHistory {
    /// Returns SQL migration statements for the per-tier duration rollup.
    #[must_use]
    pub fn migrations() -> &'static [&'static str] {
        &[
            r#"
CREATE TABLE IF NOT EXISTS sa_tier_durations (
    tier TEXT PRIMARY KEY,
    average_ms DOUBLE PRECISION NOT NULL,
    samples INTEGER NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_sa_tier_durations_updated ON sa_tier_durations (updated_at);
"#,
        ]
    }
}

impl MetricsHistory for PostgresHistory {
    fn load(&self) -> Vec<TierSeed> {
        // Stub: actual DB reads require a runtime + client; absent history
        // means the tracker keeps its per-tier defaults.
        Vec::new()
    }
}
