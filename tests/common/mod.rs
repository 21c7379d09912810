//! Common test utilities and mocks
//!
//! This module provides shared test infrastructure for all test modules.

#![allow(dead_code)]

mod mocks;

pub use mocks::*;

use dis_ingest_sdk::model::{PutRecordsRequestEntry, PutRecordsResult, PutRecordsResultEntry};
use dis_ingest_sdk::{BackoffPolicy, DisConfiguration};
use std::time::Duration;

/// Create `n` records whose payload is `record-{i}`
pub fn create_test_records(n: usize) -> Vec<PutRecordsRequestEntry> {
    (0..n)
        .map(|i| {
            PutRecordsRequestEntry::new(format!("record-{}", i).into_bytes())
                .with_partition_key(format!("key-{}", i % 3))
        })
        .collect()
}

/// Payload of a test record as text
pub fn label(record: &PutRecordsRequestEntry) -> String {
    String::from_utf8_lossy(&record.data).into_owned()
}

/// Index encoded in a `record-{i}` payload
pub fn index_of(record: &PutRecordsRequestEntry) -> usize {
    label(record)
        .trim_start_matches("record-")
        .parse()
        .expect("test record payload")
}

/// Success entry whose sequence number echoes the record payload
pub fn ok_entry(record: &PutRecordsRequestEntry) -> PutRecordsResultEntry {
    PutRecordsResultEntry::success("shardId-0000000000", label(record))
}

pub fn throttled_entry() -> PutRecordsResultEntry {
    PutRecordsResultEntry::failure("DIS.4303", "Exceeded traffic control limit")
}

/// Answer `records`, failing the ones `fails` selects
pub fn respond<F>(records: &[PutRecordsRequestEntry], fails: F) -> PutRecordsResult
where
    F: Fn(&PutRecordsRequestEntry) -> bool,
{
    let entries: Vec<_> = records
        .iter()
        .map(|r| if fails(r) { throttled_entry() } else { ok_entry(r) })
        .collect();
    PutRecordsResult {
        failed_record_count: entries.iter().filter(|e| e.is_failure()).count(),
        records: entries,
    }
}

/// Backoff of 10ms doubling up to 80ms
pub fn fast_backoff() -> BackoffPolicy {
    BackoffPolicy::new(Duration::from_millis(10), 2.0, Duration::from_millis(80))
}

/// Create a test configuration pointing at `endpoint`
pub fn create_test_config(endpoint: &str) -> DisConfiguration {
    DisConfiguration::new(
        endpoint.to_string(),
        "region-1".to_string(),
        "test_project".to_string(),
    )
    .with_backoff(1, 1.0, 1)
}
