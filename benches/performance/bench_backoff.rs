//! Performance benchmark for backoff interval computation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dis_ingest_sdk::BackoffPolicy;
use std::time::Duration;

fn bench_backoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("backoff");

    let policy = BackoffPolicy::default();
    group.bench_function("timer_20_steps", |b| {
        b.iter(|| {
            let mut timer = policy.start();
            for _ in 0..20 {
                black_box(timer.next_backoff());
            }
        });
    });

    let mut jittered = BackoffPolicy::default();
    jittered.jitter = true;
    group.bench_function("timer_20_steps_jitter", |b| {
        b.iter(|| {
            let mut timer = jittered.start();
            for _ in 0..20 {
                black_box(timer.next_backoff());
            }
        });
    });

    group.bench_function("next_interval", |b| {
        b.iter(|| black_box(policy.next_interval(black_box(Duration::from_millis(750)))));
    });

    group.finish();
}

criterion_group!(benches, bench_backoff);
criterion_main!(benches);
