//! Per-tier processing metrics and queue-wait estimation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::policy::Tier;
use crate::core::request::ScanRequest;

/// Default moving-average window: samples beyond this are down-weighted.
pub const DEFAULT_METRICS_WINDOW: u32 = 50;

/// Baseline target count used by the default ETA size scaling.
pub const DEFAULT_BASELINE_TARGETS: usize = 5;

/// Conservative default duration for a tier before any observation exists.
#[must_use]
pub fn default_average_ms(tier: Tier) -> f64 {
    match tier {
        Tier::Free => 180_000.0,
        Tier::Basic => 120_000.0,
        Tier::Premium => 90_000.0,
        Tier::Enterprise => 60_000.0,
        Tier::Unlimited => 45_000.0,
    }
}

/// Moving-average state for one tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierMetrics {
    /// Moving average of observed job duration in milliseconds.
    pub average_ms: f64,
    /// Samples contributing to the average, capped at the window size.
    pub samples: u32,
    /// Time of the last update, milliseconds since epoch.
    pub updated_at_ms: u128,
}

/// Durable per-tier observation used to seed the tracker at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierSeed {
    /// Tier the history belongs to.
    pub tier: Tier,
    /// Historical average duration in milliseconds.
    pub average_ms: f64,
    /// Number of historical samples behind the average.
    pub samples: u32,
}

/// Tracks a per-tier moving average of job duration.
///
/// Every completion is recorded, success or failure alike: a failed job still
/// consumed wall-clock time. Tiers start from conservative defaults so
/// estimation never fails for a tier with zero samples.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    window: u32,
    tiers: HashMap<Tier, TierMetrics>,
}

impl MetricsTracker {
    /// Create a tracker seeded with per-tier defaults.
    #[must_use]
    pub fn new(window: u32) -> Self {
        let window = window.max(1);
        let tiers = Tier::ALL
            .iter()
            .map(|&tier| {
                (
                    tier,
                    TierMetrics {
                        average_ms: default_average_ms(tier),
                        samples: 0,
                        updated_at_ms: 0,
                    },
                )
            })
            .collect();
        Self { window, tiers }
    }

    /// Overlay durable history on top of the defaults.
    ///
    /// Seeds with non-finite or non-positive averages are ignored rather than
    /// poisoning the tracker.
    pub fn apply_history(&mut self, seeds: &[TierSeed], now_ms: u128) {
        for seed in seeds {
            if !seed.average_ms.is_finite() || seed.average_ms <= 0.0 {
                tracing::warn!(tier = ?seed.tier, "ignoring invalid metrics seed");
                continue;
            }
            self.tiers.insert(
                seed.tier,
                TierMetrics {
                    average_ms: seed.average_ms,
                    samples: seed.samples.min(self.window),
                    updated_at_ms: now_ms,
                },
            );
        }
    }

    /// Fold one observed duration into the tier's moving average.
    pub fn record_completion(&mut self, tier: Tier, duration_ms: u64, now_ms: u128) {
        let entry = self.tiers.entry(tier).or_insert(TierMetrics {
            average_ms: default_average_ms(tier),
            samples: 0,
            updated_at_ms: 0,
        });
        // Weighted update; once the window is full, older samples are
        // down-weighted instead of dominating forever.
        let weight = f64::from(entry.samples.min(self.window - 1));
        let duration = duration_ms as f64;
        entry.average_ms = if entry.samples == 0 {
            duration
        } else {
            (entry.average_ms * weight + duration) / (weight + 1.0)
        };
        entry.samples = entry.samples.saturating_add(1).min(self.window);
        entry.updated_at_ms = now_ms;
    }

    /// Current average duration for a tier (default if unobserved).
    #[must_use]
    pub fn average_ms(&self, tier: Tier) -> f64 {
        self.tiers
            .get(&tier)
            .map_or_else(|| default_average_ms(tier), |m| m.average_ms)
    }

    /// Number of samples behind the tier's average, capped at the window.
    #[must_use]
    pub fn samples(&self, tier: Tier) -> u32 {
        self.tiers.get(&tier).map_or(0, |m| m.samples)
    }

    /// Snapshot of all tier metrics, for status surfaces and persistence.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<Tier, TierMetrics> {
        self.tiers.clone()
    }
}

/// Summary of one queued request ordered ahead of another in the global queue.
#[derive(Debug, Clone, Copy)]
pub struct QueuedAhead {
    /// Tier of the queued request.
    pub tier: Tier,
    /// Number of targets it will scan.
    pub target_count: usize,
}

/// Replaceable strategy estimating when a queued request will start.
///
/// The size-scaling heuristic is a tunable estimate, not a contract, so it
/// sits behind a trait rather than being baked into the scheduler.
pub trait EtaStrategy: Send + Sync {
    /// Estimated wall-clock start, milliseconds since epoch.
    ///
    /// Must return a finite, non-negative time even for tiers with zero
    /// samples.
    fn estimate_start_ms(
        &self,
        request: &ScanRequest,
        ahead: &[QueuedAhead],
        metrics: &MetricsTracker,
        now_ms: u128,
    ) -> u128;
}

/// Default ETA strategy: sums the tier averages of every request ahead in the
/// global queue, scaled by target count relative to a baseline.
#[derive(Debug, Clone, Copy)]
pub struct SizeScaledEta {
    /// Target count treated as a "typical" job.
    pub baseline_targets: usize,
}

impl Default for SizeScaledEta {
    fn default() -> Self {
        Self {
            baseline_targets: DEFAULT_BASELINE_TARGETS,
        }
    }
}

impl SizeScaledEta {
    fn size_factor(&self, target_count: usize) -> f64 {
        let baseline = self.baseline_targets.max(1) as f64;
        (target_count.max(1) as f64 / baseline).max(0.25)
    }
}

impl EtaStrategy for SizeScaledEta {
    fn estimate_start_ms(
        &self,
        request: &ScanRequest,
        ahead: &[QueuedAhead],
        metrics: &MetricsTracker,
        now_ms: u128,
    ) -> u128 {
        let wait_ms = if ahead.is_empty() {
            metrics.average_ms(request.tier)
        } else {
            ahead
                .iter()
                .map(|a| metrics.average_ms(a.tier) * self.size_factor(a.target_count))
                .sum()
        };
        let wait_ms = if wait_ms.is_finite() && wait_ms > 0.0 {
            wait_ms
        } else {
            0.0
        };
        now_ms + wait_ms as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ids::{QueueId, TenantId};

    fn request(tier: Tier, targets: usize) -> ScanRequest {
        ScanRequest {
            queue_id: QueueId::generate(),
            tenant: TenantId::from("tenant-a"),
            tier,
            target_ids: (0..targets).map(|i| format!("t{i}")).collect(),
            priority: 0,
            queued_at_ms: 0,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn zero_samples_uses_tier_default() {
        let tracker = MetricsTracker::new(DEFAULT_METRICS_WINDOW);
        assert_eq!(tracker.samples(Tier::Free), 0);
        assert!((tracker.average_ms(Tier::Free) - default_average_ms(Tier::Free)).abs() < 1e-9);
    }

    #[test]
    fn first_observation_replaces_default() {
        let mut tracker = MetricsTracker::new(DEFAULT_METRICS_WINDOW);
        tracker.record_completion(Tier::Premium, 10_000, 1);
        assert!((tracker.average_ms(Tier::Premium) - 10_000.0).abs() < 1e-9);
        assert_eq!(tracker.samples(Tier::Premium), 1);
    }

    #[test]
    fn average_converges_to_constant_workload() {
        let mut tracker = MetricsTracker::new(DEFAULT_METRICS_WINDOW);
        for i in 0..200 {
            tracker.record_completion(Tier::Basic, 30_000, i);
        }
        assert!((tracker.average_ms(Tier::Basic) - 30_000.0).abs() < 1.0);
        // Sample display is capped at the window.
        assert_eq!(tracker.samples(Tier::Basic), DEFAULT_METRICS_WINDOW);
    }

    #[test]
    fn history_seed_overrides_defaults_and_rejects_garbage() {
        let mut tracker = MetricsTracker::new(DEFAULT_METRICS_WINDOW);
        tracker.apply_history(
            &[
                TierSeed {
                    tier: Tier::Free,
                    average_ms: 42_000.0,
                    samples: 400,
                },
                TierSeed {
                    tier: Tier::Basic,
                    average_ms: f64::NAN,
                    samples: 10,
                },
            ],
            7,
        );
        assert!((tracker.average_ms(Tier::Free) - 42_000.0).abs() < 1e-9);
        assert_eq!(tracker.samples(Tier::Free), DEFAULT_METRICS_WINDOW);
        assert!((tracker.average_ms(Tier::Basic) - default_average_ms(Tier::Basic)).abs() < 1e-9);
    }

    #[test]
    fn eta_with_empty_queue_uses_own_tier_average() {
        let tracker = MetricsTracker::new(DEFAULT_METRICS_WINDOW);
        let eta = SizeScaledEta::default();
        let req = request(Tier::Free, 3);
        let estimate = eta.estimate_start_ms(&req, &[], &tracker, 1_000);
        assert_eq!(estimate, 1_000 + default_average_ms(Tier::Free) as u128);
    }

    #[test]
    fn eta_scales_with_requests_ahead() {
        let mut tracker = MetricsTracker::new(DEFAULT_METRICS_WINDOW);
        tracker.record_completion(Tier::Premium, 20_000, 1);
        let eta = SizeScaledEta::default();
        let req = request(Tier::Premium, 5);
        let one_ahead = eta.estimate_start_ms(
            &req,
            &[QueuedAhead {
                tier: Tier::Premium,
                target_count: 5,
            }],
            &tracker,
            0,
        );
        let two_ahead = eta.estimate_start_ms(
            &req,
            &[
                QueuedAhead {
                    tier: Tier::Premium,
                    target_count: 5,
                },
                QueuedAhead {
                    tier: Tier::Premium,
                    target_count: 5,
                },
            ],
            &tracker,
            0,
        );
        assert_eq!(one_ahead, 20_000);
        assert_eq!(two_ahead, 40_000);
    }

    #[test]
    fn eta_is_finite_for_unobserved_tier() {
        let tracker = MetricsTracker::new(DEFAULT_METRICS_WINDOW);
        let eta = SizeScaledEta::default();
        let req = request(Tier::Enterprise, 1);
        let estimate = eta.estimate_start_ms(
            &req,
            &[QueuedAhead {
                tier: Tier::Enterprise,
                target_count: 1,
            }],
            &tracker,
            0,
        );
        assert!(estimate > 0);
    }
}
