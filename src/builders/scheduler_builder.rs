//! Construct a scheduler from configuration and injected collaborators.

use crate::config::SchedulerConfig;
use crate::core::metrics::MetricsTracker;
use crate::core::notifier::Notifier;
use crate::core::policy::PlanPolicy;
use crate::core::scheduler::{ScanScheduler, Spawn};
use crate::core::{ScanExecutor, SchedulerError};
use crate::infra::history::MetricsHistory;
use crate::infra::queue::InMemoryQueueStore;
use crate::util::clock::now_ms;

/// Build an in-memory-backed scheduler from validated configuration.
///
/// The metrics tracker starts from the hardcoded per-tier defaults and is
/// overlaid with durable history when a source is provided; an absent source
/// is not an error.
pub fn build_scheduler<X, N, S>(
    cfg: &SchedulerConfig,
    executor: X,
    notifier: N,
    history: Option<&dyn MetricsHistory>,
    spawner: S,
) -> Result<ScanScheduler<InMemoryQueueStore, X, N, S>, SchedulerError>
where
    X: ScanExecutor,
    N: Notifier,
    S: Spawn + Send + Sync + 'static,
{
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let policy = PlanPolicy::with_overrides(&cfg.plan_overrides());
    let mut metrics = MetricsTracker::new(cfg.metrics_window);
    if let Some(history) = history {
        let seeds = history.load();
        if seeds.is_empty() {
            tracing::debug!("metrics history empty, keeping per-tier defaults");
        } else {
            metrics.apply_history(&seeds, now_ms());
        }
    }

    Ok(ScanScheduler::new(
        policy,
        cfg.limits(),
        InMemoryQueueStore::new(),
        metrics,
        executor,
        notifier,
        spawner,
    ))
}
