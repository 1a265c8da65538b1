//! Admission control and the global scheduler loop.
//!
//! A [`ScanScheduler`] is one constructed scheduling authority owning the
//! active-count table, the queue store, and the metrics tracker. All capacity
//! accounting goes through a single `parking_lot::Mutex` so that the
//! check-then-increment in `submit`, promotions inside a tick, completions,
//! and cancellations serialize against each other; a capacity slot can never
//! be double-booked.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::core::executor::{ScanExecutor, ScanOutcome};
use crate::core::metrics::{EtaStrategy, MetricsTracker, SizeScaledEta, TierMetrics};
use crate::core::notifier::{Notifier, ScanEvent, ScanState};
use crate::core::policy::{PlanPolicy, Tier};
use crate::core::request::{Admission, ScanRequest, ScanSubmission, TenantStatus};
use crate::infra::queue::QueueStore;
use crate::util::clock::now_ms;
use crate::util::ids::{QueueId, TenantId};

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Capacity and cadence settings for one scheduler instance.
#[derive(Debug, Clone)]
pub struct SchedulerLimits {
    /// Maximum jobs in flight across all tenants.
    pub global_cap: u32,
    /// Sleep between scheduler loop ticks.
    pub tick_interval: Duration,
}

/// Mutable shared state: the only structures touched by concurrent callers.
struct SchedState<Q> {
    queues: Q,
    /// Jobs currently executing per tenant. Entries are removed when they
    /// reach zero so the table only holds tenants with work in flight.
    active: HashMap<TenantId, u32>,
    global_active: u32,
    /// Single owner of the "is the loop running" flag; guarded by the same
    /// mutex as the counters so racing submits cannot start two loops.
    loop_running: bool,
    /// Rotates the starting tenant of each promotion pass.
    rr_cursor: usize,
}

struct Inner<Q, X, N, S> {
    policy: PlanPolicy,
    limits: SchedulerLimits,
    state: Mutex<SchedState<Q>>,
    metrics: Mutex<MetricsTracker>,
    eta: Box<dyn EtaStrategy>,
    executor: X,
    notifier: N,
    spawner: S,
}

/// Fair admission-control and scheduling engine for multi-tenant scan jobs.
///
/// Cheap to clone; clones share the same scheduling authority.
pub struct ScanScheduler<Q, X, N, S> {
    inner: Arc<Inner<Q, X, N, S>>,
}

impl<Q, X, N, S> Clone for ScanScheduler<Q, X, N, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<Q, X, N, S> ScanScheduler<Q, X, N, S>
where
    Q: QueueStore,
    X: ScanExecutor,
    N: Notifier,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a scheduler with the default size-scaled ETA strategy.
    pub fn new(
        policy: PlanPolicy,
        limits: SchedulerLimits,
        queues: Q,
        metrics: MetricsTracker,
        executor: X,
        notifier: N,
        spawner: S,
    ) -> Self {
        Self::with_eta_strategy(
            policy,
            limits,
            queues,
            metrics,
            Box::new(SizeScaledEta::default()),
            executor,
            notifier,
            spawner,
        )
    }

    /// Create a scheduler with a caller-provided ETA strategy.
    #[allow(clippy::too_many_arguments)]
    pub fn with_eta_strategy(
        policy: PlanPolicy,
        limits: SchedulerLimits,
        queues: Q,
        metrics: MetricsTracker,
        eta: Box<dyn EtaStrategy>,
        executor: X,
        notifier: N,
        spawner: S,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                policy,
                limits,
                state: Mutex::new(SchedState {
                    queues,
                    active: HashMap::new(),
                    global_active: 0,
                    loop_running: false,
                    rr_cursor: 0,
                }),
                metrics: Mutex::new(metrics),
                eta,
                executor,
                notifier,
                spawner,
            }),
        }
    }

    /// Admit a submission: dispatch immediately if the tenant and global caps
    /// have headroom, queue it otherwise.
    ///
    /// Never blocks on job execution and never surfaces internal errors; the
    /// caller always gets a dispatch confirmation or a queue ticket.
    pub fn submit(&self, submission: ScanSubmission) -> Admission {
        let now = now_ms();
        let priority = self.inner.policy.priority(submission.tier);
        let request = ScanRequest {
            queue_id: QueueId::generate(),
            tenant: submission.tenant,
            tier: submission.tier,
            target_ids: submission.target_ids,
            priority,
            queued_at_ms: now,
            metadata: submission.metadata,
        };
        let queue_id = request.queue_id;

        let mut state = self.inner.state.lock();
        let active = state.active.get(&request.tenant).copied().unwrap_or(0);
        let has_headroom = self.inner.policy.limit(request.tier).allows(active)
            && state.global_active < self.inner.limits.global_cap;

        if has_headroom {
            *state.active.entry(request.tenant.clone()).or_insert(0) += 1;
            state.global_active += 1;
            drop(state);
            tracing::info!(
                queue_id = %queue_id,
                tenant = %request.tenant,
                tier = ?request.tier,
                "admitted immediately"
            );
            self.inner.start_processing(request);
            return Admission::Dispatched { queue_id };
        }

        state.queues.enqueue(request.clone());
        let position = state
            .queues
            .global_position(queue_id)
            .unwrap_or_else(|| state.queues.total_len());
        let ahead = state.queues.requests_ahead(queue_id);
        let start_loop = !state.loop_running;
        if start_loop {
            state.loop_running = true;
        }
        drop(state);

        let estimated_start_ms = {
            let metrics = self.inner.metrics.lock();
            self.inner
                .eta
                .estimate_start_ms(&request, &ahead, &metrics, now)
        };

        if start_loop {
            let inner = Arc::clone(&self.inner);
            self.inner.spawner.spawn(inner.run_loop());
        }

        tracing::info!(
            queue_id = %queue_id,
            tenant = %request.tenant,
            tier = ?request.tier,
            position,
            "capacity exhausted, queued"
        );
        self.inner
            .emit(queue_id, request.tenant.clone(), ScanState::Queued);
        Admission::Queued {
            queue_id,
            position,
            estimated_start_ms,
        }
    }

    /// Cancel a still-queued request.
    ///
    /// Returns `true` and removes it from both queue structures if it had not
    /// been dispatched yet; `false` otherwise. Idempotent: a second cancel on
    /// the same id is a no-op returning `false`. A race with a concurrent
    /// promotion resolves to whichever mutation serializes first.
    pub fn cancel(&self, tenant: &TenantId, queue_id: QueueId) -> bool {
        let removed = {
            let mut state = self.inner.state.lock();
            state.queues.remove(tenant, queue_id)
        };
        match removed {
            Some(request) => {
                tracing::info!(queue_id = %queue_id, tenant = %tenant, "cancelled queued scan");
                self.inner
                    .emit(queue_id, request.tenant, ScanState::Cancelled);
                true
            }
            None => {
                tracing::debug!(queue_id = %queue_id, tenant = %tenant, "cancel: not found queued");
                false
            }
        }
    }

    /// Read-only snapshot of one tenant's scheduling state.
    pub fn status(&self, tenant: &TenantId) -> TenantStatus {
        let state = self.inner.state.lock();
        TenantStatus {
            active_count: state.active.get(tenant).copied().unwrap_or(0),
            queued_count: state.queues.queued_count(tenant),
            position: state.queues.first_position(tenant),
        }
    }

    /// Current moving-average duration for a tier, in milliseconds.
    pub fn tier_average_ms(&self, tier: Tier) -> f64 {
        self.inner.metrics.lock().average_ms(tier)
    }

    /// Samples behind a tier's moving average.
    pub fn tier_samples(&self, tier: Tier) -> u32 {
        self.inner.metrics.lock().samples(tier)
    }

    /// Snapshot of every tier's metrics, for ops surfaces and persistence.
    pub fn metrics_snapshot(&self) -> HashMap<Tier, TierMetrics> {
        self.inner.metrics.lock().snapshot()
    }

    /// Total requests currently queued across all tenants.
    pub fn queued_total(&self) -> usize {
        self.inner.state.lock().queues.total_len()
    }

    /// Total jobs currently in flight across all tenants.
    pub fn active_total(&self) -> u32 {
        self.inner.state.lock().global_active
    }
}

impl<Q, X, N, S> Inner<Q, X, N, S>
where
    Q: QueueStore,
    X: ScanExecutor,
    N: Notifier,
    S: Spawn + Send + Sync + 'static,
{
    fn emit(&self, queue_id: QueueId, tenant: TenantId, state: ScanState) {
        self.notifier.notify(ScanEvent {
            queue_id,
            tenant,
            state,
            at_ms: now_ms(),
        });
    }

    /// Emit the processing transition and hand the request to the executor.
    /// Capacity for it has already been reserved by the caller.
    fn start_processing(self: &Arc<Self>, request: ScanRequest) {
        self.emit(request.queue_id, request.tenant.clone(), ScanState::Processing);
        self.dispatch(request);
    }

    fn dispatch(self: &Arc<Self>, request: ScanRequest) {
        let handle = Arc::clone(self);
        let queue_id = request.queue_id;
        let tenant = request.tenant.clone();
        let tier = request.tier;
        self.spawner.spawn(async move {
            tracing::debug!(queue_id = %queue_id, "executing scan");
            let started = Instant::now();
            let outcome = handle.executor.execute(request).await;
            let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            // Capacity release and metrics recording run unconditionally once
            // the executor future resolves, for either outcome; a stuck
            // counter would silently steal capacity forever.
            handle.complete(queue_id, &tenant, tier, duration_ms, outcome);
        });
    }

    fn complete(
        self: &Arc<Self>,
        queue_id: QueueId,
        tenant: &TenantId,
        tier: Tier,
        duration_ms: u64,
        outcome: ScanOutcome,
    ) {
        {
            let mut state = self.state.lock();
            let remaining = {
                let count = state.active.entry(tenant.clone()).or_insert(0);
                *count = count.saturating_sub(1);
                *count
            };
            if remaining == 0 {
                state.active.remove(tenant);
            }
            state.global_active = state.global_active.saturating_sub(1);
        }

        // A failed job still consumed wall-clock time; record it regardless.
        self.metrics.lock().record_completion(tier, duration_ms, now_ms());

        let terminal = match outcome {
            ScanOutcome::Success => ScanState::Completed,
            ScanOutcome::Failure => ScanState::Failed,
        };
        tracing::info!(
            queue_id = %queue_id,
            tenant = %tenant,
            duration_ms,
            outcome = ?outcome,
            "scan finished"
        );
        self.emit(queue_id, tenant.clone(), terminal);

        // Promote immediately instead of waiting for the next tick.
        let promoted = {
            let mut state = self.state.lock();
            self.promote_pass(&mut state)
        };
        for request in promoted {
            self.start_processing(request);
        }
    }

    /// One promotion round: round-robin over tenants with queued work,
    /// at most one promotion per tenant per pass, repeated until a full pass
    /// makes no progress or the global cap is exhausted.
    ///
    /// Priority orders the tenant list (via the global queue), but the
    /// rotating cursor guarantees the starting point moves every round, so a
    /// low-priority tenant with per-tenant headroom is promoted within a
    /// bounded number of ticks no matter how fast others submit.
    fn promote_pass(&self, state: &mut SchedState<Q>) -> Vec<ScanRequest> {
        let mut promoted = Vec::new();
        loop {
            if state.global_active >= self.limits.global_cap {
                break;
            }
            let tenants = state.queues.tenants_with_work();
            if tenants.is_empty() {
                break;
            }
            let n = tenants.len();
            let start = state.rr_cursor % n;
            let mut progress = false;
            for i in 0..n {
                if state.global_active >= self.limits.global_cap {
                    break;
                }
                let tenant = &tenants[(start + i) % n];
                let Some(head) = state.queues.head(tenant) else {
                    continue;
                };
                let tier = head.tier;
                let active = state.active.get(tenant).copied().unwrap_or(0);
                if !self.policy.limit(tier).allows(active) {
                    continue;
                }
                let Some(request) = state.queues.pop_front(tenant) else {
                    // Queue drained between the head check and the pop; only
                    // reachable through a store bug, but one bad tenant must
                    // not stall the pass.
                    tracing::warn!(tenant = %tenant, "head vanished during promotion");
                    continue;
                };
                *state.active.entry(tenant.clone()).or_insert(0) += 1;
                state.global_active += 1;
                tracing::debug!(
                    queue_id = %request.queue_id,
                    tenant = %tenant,
                    "promoted from queue"
                );
                promoted.push(request);
                progress = true;
            }
            if !progress {
                break;
            }
        }
        // Rotate only when the pass made progress, so ticks that find no
        // headroom cannot skew whose turn comes up next.
        if !promoted.is_empty() {
            state.rr_cursor = state.rr_cursor.wrapping_add(1);
        }
        promoted
    }

    /// Background loop: ticks while queued or in-flight work exists, then
    /// clears its own flag and exits; the next enqueue restarts it lazily.
    async fn run_loop(self: Arc<Self>) {
        tracing::debug!("scheduler loop started");
        loop {
            tokio::time::sleep(self.limits.tick_interval).await;
            let promoted = {
                let mut state = self.state.lock();
                self.promote_pass(&mut state)
            };
            for request in promoted {
                self.start_processing(request);
            }
            let mut state = self.state.lock();
            if state.queues.is_empty() && state.global_active == 0 {
                state.loop_running = false;
                drop(state);
                tracing::debug!("scheduler loop idle, stopping");
                break;
            }
        }
    }
}
