//! Randomized submission/completion simulation checking the capacity
//! invariants hold at every point in time, with cancellations mixed in.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;

use scan_admission::builders::build_scheduler;
use scan_admission::config::SchedulerConfig;
use scan_admission::core::{
    Admission, NoopNotifier, ScanExecutor, ScanOutcome, ScanRequest, ScanSubmission, Spawn, Tier,
};
use scan_admission::util::ids::TenantId;

#[derive(Clone)]
struct TestSpawner;

impl Spawn for TestSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(fut);
    }
}

const GLOBAL_CAP: u32 = 8;

fn tier_limit(tier: Tier) -> u32 {
    match tier {
        Tier::Free => 1,
        Tier::Basic => 3,
        Tier::Premium => 10,
        Tier::Enterprise => 25,
        Tier::Unlimited => u32::MAX,
    }
}

/// Executor that verifies, from inside every running job, that neither the
/// per-tenant cap nor the global cap is ever exceeded.
#[derive(Clone)]
struct InvariantExecutor {
    running: Arc<Mutex<HashMap<TenantId, u32>>>,
    global: Arc<Mutex<u32>>,
    violations: Arc<Mutex<Vec<String>>>,
    finished: Arc<Mutex<u32>>,
}

impl InvariantExecutor {
    fn new() -> Self {
        Self {
            running: Arc::new(Mutex::new(HashMap::new())),
            global: Arc::new(Mutex::new(0)),
            violations: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(Mutex::new(0)),
        }
    }
}

#[async_trait]
impl ScanExecutor for InvariantExecutor {
    async fn execute(&self, request: ScanRequest) -> ScanOutcome {
        let delay_ms;
        let failed;
        {
            let mut running = self.running.lock();
            let count = running.entry(request.tenant.clone()).or_insert(0);
            *count += 1;
            if *count > tier_limit(request.tier) {
                self.violations.lock().push(format!(
                    "tenant {} ({:?}) over cap: {}",
                    request.tenant, request.tier, count
                ));
            }
            let mut global = self.global.lock();
            *global += 1;
            if *global > GLOBAL_CAP {
                self.violations.lock().push(format!("global over cap: {global}"));
            }
            let mut rng = rand::rng();
            delay_ms = rng.random_range(1..15);
            failed = rng.random_bool(0.2);
        }
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        {
            let mut running = self.running.lock();
            if let Some(count) = running.get_mut(&request.tenant) {
                *count -= 1;
            }
            *self.global.lock() -= 1;
            *self.finished.lock() += 1;
        }
        if failed {
            ScanOutcome::Failure
        } else {
            ScanOutcome::Success
        }
    }
}

#[tokio::test]
async fn randomized_workload_never_violates_caps() {
    scan_admission::util::telemetry::init_tracing();
    let cfg = SchedulerConfig {
        global_cap: GLOBAL_CAP,
        tick_interval_ms: 10,
        ..SchedulerConfig::default()
    };
    let executor = InvariantExecutor::new();
    let scheduler =
        build_scheduler(&cfg, executor.clone(), NoopNotifier, None, TestSpawner).unwrap();

    let tiers = [Tier::Free, Tier::Basic, Tier::Premium];
    // Pre-generate the plan so the rng never crosses an await point.
    let plan: Vec<(String, Tier, bool)> = {
        let mut rng = rand::rng();
        (0..200)
            .map(|_| {
                let tenant = format!("tenant-{}", rng.random_range(0..6));
                let tier = tiers[rng.random_range(0..tiers.len())];
                let try_cancel = rng.random_bool(0.1);
                (tenant, tier, try_cancel)
            })
            .collect()
    };

    let mut cancelled = 0u32;
    let mut submitted = 0u32;
    for (tenant, tier, try_cancel) in plan {
        let admission = scheduler.submit(ScanSubmission {
            tenant: TenantId::from(tenant.as_str()),
            tier,
            target_ids: vec!["site".into()],
            metadata: serde_json::Value::Null,
        });
        submitted += 1;
        if try_cancel {
            if let Admission::Queued { queue_id, .. } = admission {
                if scheduler.cancel(&TenantId::from(tenant.as_str()), queue_id) {
                    cancelled += 1;
                }
            }
        }
        if submitted % 25 == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    // Everything not cancelled must eventually run exactly once.
    let expected = submitted - cancelled;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(20);
    while *executor.finished.lock() < expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "workload did not drain: {} of {expected}",
            *executor.finished.lock()
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    assert_eq!(*executor.finished.lock(), expected);
    assert!(
        executor.violations.lock().is_empty(),
        "invariant violations: {:?}",
        executor.violations.lock()
    );
    assert_eq!(scheduler.active_total(), 0);
    assert_eq!(scheduler.queued_total(), 0);
}
