//! Benchmarks for the queue store and metrics tracker hot paths.
//!
//! Covers:
//! - Enqueue into the global priority order at varying depths
//! - Head pop and targeted removal (cancellation)
//! - Position/ahead lookups driving ETA computation
//! - Moving-average updates

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use scan_admission::core::{MetricsTracker, ScanRequest, Tier, DEFAULT_METRICS_WINDOW};
use scan_admission::infra::queue::{InMemoryQueueStore, QueueStore};
use scan_admission::util::clock::now_ms;
use scan_admission::util::ids::{QueueId, TenantId};

fn request(tenant: u32, priority: u8) -> ScanRequest {
    ScanRequest {
        queue_id: QueueId::generate(),
        tenant: TenantId::new(format!("tenant-{tenant}")),
        tier: Tier::Premium,
        target_ids: vec!["site-1".into(), "site-2".into()],
        priority,
        queued_at_ms: now_ms(),
        metadata: serde_json::Value::Null,
    }
}

fn filled_store(depth: usize) -> InMemoryQueueStore {
    let mut store = InMemoryQueueStore::new();
    for i in 0..depth {
        store.enqueue(request(i as u32 % 16, (i % 5) as u8));
    }
    store
}

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_enqueue");
    for depth in [64_usize, 512, 4096] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter_batched(
                || (filled_store(depth), request(3, 2)),
                |(mut store, req)| store.enqueue(black_box(req)),
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_pop_and_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_pop_remove");
    group.bench_function("pop_front", |b| {
        b.iter_batched(
            || filled_store(1024),
            |mut store| {
                let tenant = store.tenants_with_work().remove(0);
                black_box(store.pop_front(&tenant))
            },
            criterion::BatchSize::SmallInput,
        );
    });
    group.bench_function("cancel_mid_queue", |b| {
        b.iter_batched(
            || {
                let mut store = filled_store(1024);
                let victim = request(3, 2);
                let id = victim.queue_id;
                let tenant = victim.tenant.clone();
                store.enqueue(victim);
                (store, tenant, id)
            },
            |(mut store, tenant, id)| black_box(store.remove(&tenant, id)),
            criterion::BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_position_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_lookups");
    let mut store = filled_store(2048);
    let probe = request(7, 1);
    let id = probe.queue_id;
    store.enqueue(probe);
    group.bench_function("global_position", |b| {
        b.iter(|| black_box(store.global_position(black_box(id))));
    });
    group.bench_function("requests_ahead", |b| {
        b.iter(|| black_box(store.requests_ahead(black_box(id))));
    });
    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    c.bench_function("metrics_record_completion", |b| {
        let mut tracker = MetricsTracker::new(DEFAULT_METRICS_WINDOW);
        b.iter(|| tracker.record_completion(Tier::Premium, black_box(42_000), now_ms()));
    });
}

criterion_group!(
    benches,
    bench_enqueue,
    bench_pop_and_remove,
    bench_position_lookups,
    bench_metrics
);
criterion_main!(benches);
