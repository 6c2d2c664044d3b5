//! Capture store benchmarks.
//!
//! The insert path is the latency-sensitive one: a single `add` on a warm
//! store should stay well under 100µs.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use snsmock_core::CapturedMessage;
use snsmock_store::CaptureStore;
use std::sync::atomic::{AtomicU64, Ordering};

// Global counter to ensure unique message ids across all benchmark iterations
static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_message(topic: &str, body_size: usize) -> CapturedMessage {
    let n = MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
    CapturedMessage::new(
        format!("m-{n}"),
        topic,
        "x".repeat(body_size),
        Utc::now(),
        Vec::new(),
    )
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_add");

    for body_size in [100, 1000, 10000] {
        let store = CaptureStore::with_capacity(100_000).unwrap();

        group.throughput(Throughput::Bytes(body_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(body_size),
            &body_size,
            |b, &body_size| {
                b.iter(|| black_box(store.add(next_message("bench-topic", body_size)).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_add_with_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_add_evicting");

    // A full store, so every insert evicts the head.
    let store = CaptureStore::with_capacity(1000).unwrap();
    for _ in 0..1000 {
        store.add(next_message("bench-topic", 100)).unwrap();
    }

    group.bench_function("capacity_1000", |b| {
        b.iter(|| black_box(store.add(next_message("bench-topic", 100)).unwrap()));
    });

    group.finish();
}

fn bench_get_by_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_get_by_id");

    let store = CaptureStore::with_capacity(10_000).unwrap();
    for i in 0..10_000 {
        store
            .add(CapturedMessage::new(
                format!("fixed-{i}"),
                "bench-topic",
                "body",
                Utc::now(),
                Vec::new(),
            ))
            .unwrap();
    }

    group.bench_function("warm_10k", |b| {
        b.iter(|| black_box(store.get_by_id("fixed-5000").unwrap()));
    });

    group.finish();
}

fn bench_get_by_topic(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_get_by_topic");

    for per_topic in [10, 100, 1000] {
        let store = CaptureStore::with_capacity(10_000).unwrap();
        for i in 0..per_topic {
            store
                .add(CapturedMessage::new(
                    format!("t-{i}"),
                    "bench-topic",
                    "body",
                    Utc::now(),
                    Vec::new(),
                ))
                .unwrap();
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(per_topic),
            &store,
            |b, store| {
                b.iter(|| black_box(store.get_by_topic("bench-topic").unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_add,
    bench_add_with_eviction,
    bench_get_by_id,
    bench_get_by_topic
);
criterion_main!(benches);
