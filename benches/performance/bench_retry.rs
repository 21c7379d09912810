//! Performance benchmark for the batch-write retry coordinator
//!
//! Measures coordinator overhead for batches of different sizes and failure
//! rates. Runs on a paused clock, so backoff sleeps cost no wall time.

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dis_ingest_sdk::model::{PutRecordsRequestEntry, PutRecordsResult, PutRecordsResultEntry};
use dis_ingest_sdk::{BackoffPolicy, BatchSender, BatchWriteRetryCoordinator, DisError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Fails every `fail_every`-th record of the first attempt
struct FlakySender {
    fail_every: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl BatchSender for FlakySender {
    async fn send(
        &self,
        _stream_name: &str,
        records: &[PutRecordsRequestEntry],
    ) -> Result<PutRecordsResult, DisError> {
        let first = self.calls.fetch_add(1, Ordering::Relaxed) == 0;
        let entries: Vec<_> = (0..records.len())
            .map(|i| {
                if first && i % self.fail_every == 0 {
                    PutRecordsResultEntry::failure("DIS.4303", "busy")
                } else {
                    PutRecordsResultEntry::success("shardId-0000000000", i.to_string())
                }
            })
            .collect();
        Ok(PutRecordsResult {
            failed_record_count: entries.iter().filter(|e| e.is_failure()).count(),
            records: entries,
        })
    }
}

fn create_test_records(n: usize) -> Vec<PutRecordsRequestEntry> {
    (0..n)
        .map(|i| {
            PutRecordsRequestEntry::new(vec![b'x'; 256])
                .with_partition_key(format!("key-{}", i))
        })
        .collect()
}

fn bench_retry(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();
    let coordinator = BatchWriteRetryCoordinator::new(
        3,
        BackoffPolicy::new(Duration::from_millis(100), 1.5, Duration::from_secs(1)),
    );

    let mut group = c.benchmark_group("retry");

    for size in [10, 100, 500] {
        let records = create_test_records(size);
        for fail_every in [1, 10] {
            group.bench_with_input(
                BenchmarkId::new(format!("fail_1_in_{}", fail_every), size),
                &records,
                |b, records| {
                    b.iter(|| {
                        let sender = FlakySender {
                            fail_every,
                            calls: AtomicUsize::new(0),
                        };
                        let outcome = rt
                            .block_on(coordinator.submit_with_retry(&sender, "bench", records))
                            .unwrap();
                        black_box(outcome.failed_record_count)
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_retry);
criterion_main!(benches);
