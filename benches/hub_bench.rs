//! Performance benchmarks for async-logger.
//!
//! Run with: cargo bench

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use async_logger::hub::{CallRecord, StatAggregator, StatSnapshot, SubscriberRegistry, TelemetryHub};
use async_logger::metrics::MetricsRegistry;
use async_logger::AclTables;

/// ACL with `consumers` consumers, each granted a handful of methods
fn build_acl(consumers: usize) -> AclTables {
    let entries: Vec<String> = (0..consumers)
        .map(|i| {
            format!(
                r#""consumer-{i}": ["/logger.Biz/Check", "/logger.Biz/Add", "/logger.Admin/Logging"]"#
            )
        })
        .collect();
    AclTables::parse(&format!("{{{}}}", entries.join(","))).unwrap()
}

/// Benchmark ACL lookups
fn bench_acl_lookup(c: &mut Criterion) {
    let tables = build_acl(1000);

    c.bench_function("acl_lookup_hit", |b| {
        b.iter(|| black_box(tables.business.lookup("consumer-500", "Biz", "Add")));
    });

    c.bench_function("acl_lookup_miss", |b| {
        b.iter(|| black_box(tables.business.lookup("consumer-500", "Biz", "Test")));
    });

    c.bench_function("acl_parse_1000", |b| {
        let payload = {
            let entries: Vec<String> = (0..1000)
                .map(|i| format!(r#""consumer-{i}": ["/logger.Biz/*"]"#))
                .collect();
            format!("{{{}}}", entries.join(","))
        };
        b.iter(|| black_box(AclTables::parse(&payload).unwrap()));
    });
}

/// Benchmark registry fan-out with drained subscribers
fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");

    for subscribers in [1, 8, 64].iter() {
        let registry = Arc::new(SubscriberRegistry::<u64>::new("bench", 1024));
        let mut subs: Vec<_> = (0..*subscribers).map(|_| registry.subscribe()).collect();

        group.throughput(Throughput::Elements(*subscribers as u64));
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            subscribers,
            |b, _| {
                b.iter(|| {
                    black_box(registry.broadcast(&42));
                    for sub in subs.iter_mut() {
                        black_box(sub.try_recv());
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a full hub emission to log and stat subscribers
fn bench_hub_emit(c: &mut Criterion) {
    let hub = TelemetryHub::new(1024, Arc::new(MetricsRegistry::new()));
    let mut logs = hub.logs().subscribe();
    let mut stats = hub.stats().subscribe();

    c.bench_function("hub_emit", |b| {
        b.iter(|| {
            hub.emit(CallRecord {
                consumer: "consumer-1".to_string(),
                method: "/logger.Biz/Check".to_string(),
                host: "127.0.0.1:50000".to_string(),
            });
            black_box(logs.try_recv());
            black_box(stats.try_recv());
        });
    });
}

/// Benchmark stat window merging
fn bench_stat_merge(c: &mut Criterion) {
    let aggregator = StatAggregator::new();
    let increments: Vec<_> = (0..16)
        .map(|i| StatSnapshot::increment(&format!("consumer-{i}"), "/logger.Biz/Check"))
        .collect();

    c.bench_function("stat_merge_16", |b| {
        b.iter(|| {
            for increment in &increments {
                aggregator.merge(increment);
            }
            black_box(aggregator.take());
        });
    });
}

criterion_group!(
    benches,
    bench_acl_lookup,
    bench_broadcast,
    bench_hub_emit,
    bench_stat_merge
);
criterion_main!(benches);
