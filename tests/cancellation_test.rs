//! Cancellation semantics: idempotency, status bookkeeping, and the
//! cancel-versus-promotion race.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use scan_admission::builders::build_scheduler;
use scan_admission::config::SchedulerConfig;
use scan_admission::core::{
    InMemoryNotifier, ScanExecutor, ScanOutcome, ScanRequest, ScanState, ScanSubmission, Spawn,
    Tier,
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

#[derive(Clone)]
struct BlockingExecutor;

#[async_trait]
impl ScanExecutor for BlockingExecutor {
    async fn execute(&self, _request: ScanRequest) -> ScanOutcome {
        tokio::time::sleep(Duration::from_secs(60)).await;
        ScanOutcome::Success
    }
}

fn submission(tenant: &str) -> ScanSubmission {
    ScanSubmission {
        tenant: TenantId::from(tenant),
        tier: Tier::Free,
        target_ids: vec!["site".into()],
        metadata: serde_json::Value::Null,
    }
}

#[tokio::test]
async fn cancel_queued_request_then_second_cancel_is_noop() {
    let notifier = Arc::new(InMemoryNotifier::new());
    let scheduler = build_scheduler(
        &SchedulerConfig::default(),
        BlockingExecutor,
        Arc::clone(&notifier),
        None,
        TestSpawner,
    )
    .unwrap();

    let tenant = TenantId::from("t");
    scheduler.submit(submission("t"));
    let queued = scheduler.submit(submission("t")).queue_id();
    assert_eq!(scheduler.status(&tenant).queued_count, 1);

    assert!(scheduler.cancel(&tenant, queued));
    assert_eq!(scheduler.status(&tenant).queued_count, 0);
    assert_eq!(notifier.events_for(queued), vec![ScanState::Queued, ScanState::Cancelled]);

    // Second cancel on the same id: no-op, no error.
    assert!(!scheduler.cancel(&tenant, queued));
}

#[tokio::test]
async fn cancel_dispatched_request_returns_false() {
    let scheduler = build_scheduler(
        &SchedulerConfig::default(),
        BlockingExecutor,
        InMemoryNotifier::new(),
        None,
        TestSpawner,
    )
    .unwrap();

    let tenant = TenantId::from("t");
    let dispatched = scheduler.submit(submission("t")).queue_id();
    assert!(!scheduler.cancel(&tenant, dispatched));
    // Capacity accounting is untouched by the failed cancel.
    assert_eq!(scheduler.status(&tenant).active_count, 1);
}

#[tokio::test]
async fn cancel_unknown_id_returns_false() {
    let scheduler = build_scheduler(
        &SchedulerConfig::default(),
        BlockingExecutor,
        InMemoryNotifier::new(),
        None,
        TestSpawner,
    )
    .unwrap();

    let tenant = TenantId::from("nobody");
    assert!(!scheduler.cancel(&tenant, scan_admission::util::ids::QueueId::generate()));
}

#[tokio::test]
async fn status_is_read_only() {
    let scheduler = build_scheduler(
        &SchedulerConfig::default(),
        BlockingExecutor,
        InMemoryNotifier::new(),
        None,
        TestSpawner,
    )
    .unwrap();

    let tenant = TenantId::from("t");
    scheduler.submit(submission("t"));
    scheduler.submit(submission("t"));

    let first = scheduler.status(&tenant);
    let second = scheduler.status(&tenant);
    assert_eq!(first, second);
    assert_eq!(first.active_count, 1);
    assert_eq!(first.queued_count, 1);
    assert_eq!(first.position, Some(1));
}
