//! Integration tests for the batch-write retry coordinator
//!
//! Time is paused, so backoff sleeps complete instantly while `tokio::time::Instant`
//! still observes their length.

mod common;

use common::*;
use dis_ingest_sdk::model::PutRecordsResult;
use dis_ingest_sdk::{BackoffPolicy, BatchWriteRetryCoordinator, DisError, Termination};
use std::collections::HashSet;
use std::time::Duration;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn assert_gaps(actual: &[Duration], expected_ms: &[u64]) {
    assert_eq!(actual.len(), expected_ms.len(), "gaps: {:?}", actual);
    for (gap, expected) in actual.iter().zip(expected_ms) {
        assert!(
            *gap >= ms(*expected) && *gap < ms(*expected + 2),
            "expected ~{}ms, got {:?} (all gaps: {:?})",
            expected,
            gap,
            actual
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_returns_immediately() {
    let coordinator = BatchWriteRetryCoordinator::new(5, fast_backoff());
    let sender = ScriptedSender::new(|_, records| Ok(respond(records, |_| false)));
    let records = create_test_records(4);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    assert_eq!(outcome.failed_record_count, 0);
    assert_eq!(outcome.attempts, 1);
    assert!(matches!(outcome.termination, Termination::Completed));
    assert_eq!(sender.call_count(), 1);
    assert_eq!(sender.streams(), vec!["stream".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_fast_path_never_takes_retry_lock() {
    let coordinator = BatchWriteRetryCoordinator::new(5, fast_backoff());
    let lock = coordinator.retry_lock();
    let _held = lock.lock().await;

    let sender = ScriptedSender::new(|_, records| Ok(respond(records, |_| false)));
    let records = create_test_records(3);

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        coordinator.submit_with_retry(&sender, "stream", &records),
    )
    .await
    .expect("fast path must not wait for the retry lock")
    .unwrap();

    assert!(outcome.is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_retries_only_failed_records_in_order() {
    let coordinator = BatchWriteRetryCoordinator::new(3, fast_backoff());
    let failing: HashSet<usize> = [2, 5, 9].into_iter().collect();
    let sender = ScriptedSender::new(move |attempt, records| {
        Ok(respond(records, |r| attempt == 0 && failing.contains(&index_of(r))))
    });
    let records = create_test_records(10);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    let calls = sender.calls();
    assert_eq!(calls.len(), 2);
    let retried: Vec<String> = calls[1].iter().map(label).collect();
    assert_eq!(retried, vec!["record-2", "record-5", "record-9"]);

    assert_eq!(outcome.failed_record_count, 0);
    assert_eq!(outcome.attempts, 2);
    assert!(matches!(outcome.termination, Termination::Completed));
    assert_eq!(outcome.records.len(), 10);
    for (i, entry) in outcome.records.iter().enumerate() {
        assert!(entry.is_success());
        assert_eq!(entry.sequence_number.as_deref(), Some(format!("record-{}", i).as_str()));
    }
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_makes_one_attempt() {
    let coordinator = BatchWriteRetryCoordinator::new(0, fast_backoff());
    let sender =
        ScriptedSender::new(|_, records| Ok(respond(records, |r| index_of(r) % 2 == 1)));
    let records = create_test_records(4);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    assert_eq!(sender.call_count(), 1);
    assert_eq!(outcome.failed_record_count, 2);
    assert_eq!(outcome.failed_record_indices(), vec![1, 3]);
    assert!(matches!(outcome.termination, Termination::RetriesExhausted));
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_transport_failure_propagates() {
    let coordinator = BatchWriteRetryCoordinator::new(5, fast_backoff());
    let sender = ScriptedSender::new(|_, _| {
        Err(DisError::ConnectionError("connection refused".to_string()))
    });
    let records = create_test_records(3);

    let result = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await;

    assert!(matches!(result, Err(DisError::ConnectionError(_))));
    assert_eq!(sender.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_transport_failure_returns_partial_snapshot() {
    let coordinator = BatchWriteRetryCoordinator::new(5, fast_backoff());
    let sender = ScriptedSender::new(|attempt, records| match attempt {
        0 => Ok(respond(records, |r| index_of(r) < 5)),
        _ => Err(DisError::ConnectionError("connection reset".to_string())),
    });
    let records = create_test_records(8);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    assert_eq!(sender.call_count(), 2);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.failed_record_count, 5);
    assert_eq!(outcome.failed_record_indices(), vec![0, 1, 2, 3, 4]);
    assert_eq!(outcome.successful_record_indices(), vec![5, 6, 7]);
    assert!(matches!(
        outcome.interrupted_by(),
        Some(DisError::ConnectionError(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_ceiling_is_respected() {
    let coordinator = BatchWriteRetryCoordinator::new(3, fast_backoff());
    let sender = ScriptedSender::new(|_, records| Ok(respond(records, |r| index_of(r) == 0)));
    let records = create_test_records(2);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    assert_eq!(sender.call_count(), 4);
    assert_eq!(outcome.attempts, 4);
    assert_eq!(outcome.failed_record_count, 1);
    assert!(matches!(outcome.termination, Termination::RetriesExhausted));
    assert_eq!(
        outcome.records[0].error_code.as_deref(),
        Some("DIS.4303")
    );
    assert!(outcome.records[1].is_success());
}

#[tokio::test(start_paused = true)]
async fn test_pending_set_only_shrinks() {
    let coordinator = BatchWriteRetryCoordinator::new(6, fast_backoff());
    // Each record fails for a number of attempts derived from its index
    let sender = ScriptedSender::new(|attempt, records| {
        Ok(respond(records, |r| index_of(r) * 7 % 5 > attempt))
    });
    let records = create_test_records(12);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    let calls = sender.calls();
    for pair in calls.windows(2) {
        let previous: HashSet<String> = pair[0].iter().map(label).collect();
        let current: Vec<String> = pair[1].iter().map(label).collect();
        assert!(current.len() < pair[0].len());
        assert!(current.iter().all(|l| previous.contains(l)));
    }
    assert!(outcome.is_complete());
    assert_eq!(outcome.records.len(), 12);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_grows_without_progress() {
    let coordinator = BatchWriteRetryCoordinator::new(5, fast_backoff());
    let sender = ScriptedSender::new(|_, records| Ok(respond(records, |r| index_of(r) == 1)));
    let records = create_test_records(3);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 6);
    assert_gaps(&sender.gaps(), &[10, 20, 40, 80, 80]);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_resets_after_partial_progress() {
    let coordinator = BatchWriteRetryCoordinator::new(10, fast_backoff());
    let sender = ScriptedSender::new(|attempt, records| {
        Ok(respond(records, |r| match attempt {
            0 | 1 => true,
            2 | 3 => index_of(r) < 2,
            _ => false,
        }))
    });
    let records = create_test_records(4);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.attempts, 5);
    assert_gaps(&sender.gaps(), &[10, 20, 10, 20]);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_budget_stops_retrying() {
    let mut policy = fast_backoff();
    policy.max_elapsed_time = Some(ms(25));
    let coordinator = BatchWriteRetryCoordinator::new(10, policy);
    let sender = ScriptedSender::new(|_, records| Ok(respond(records, |_| true)));
    let records = create_test_records(2);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    assert_eq!(sender.call_count(), 3);
    assert_eq!(outcome.failed_record_count, 2);
    assert!(matches!(outcome.termination, Termination::BackoffExpired));
}

#[tokio::test(start_paused = true)]
async fn test_mismatched_response_length() {
    let coordinator = BatchWriteRetryCoordinator::new(3, fast_backoff());
    let sender = ScriptedSender::new(|_, _| Ok(PutRecordsResult::default()));
    let records = create_test_records(2);

    let result = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await;

    assert!(matches!(result, Err(DisError::InvalidResponse(_))));
}

#[tokio::test(start_paused = true)]
async fn test_mismatched_response_on_retry_keeps_snapshot() {
    let coordinator = BatchWriteRetryCoordinator::new(3, fast_backoff());
    let sender = ScriptedSender::new(|attempt, records| match attempt {
        0 => Ok(respond(records, |r| index_of(r) == 0)),
        _ => Ok(PutRecordsResult::default()),
    });
    let records = create_test_records(3);

    let outcome = coordinator
        .submit_with_retry(&sender, "stream", &records)
        .await
        .unwrap();

    assert_eq!(outcome.failed_record_count, 1);
    assert!(matches!(
        outcome.interrupted_by(),
        Some(DisError::InvalidResponse(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_empty_batch_rejected() {
    let coordinator = BatchWriteRetryCoordinator::new(3, BackoffPolicy::default());
    let sender = ScriptedSender::new(|_, records| Ok(respond(records, |_| false)));

    let result = coordinator.submit_with_retry(&sender, "stream", &[]).await;

    assert!(matches!(result, Err(DisError::InvalidRequest(_))));
    assert_eq!(sender.call_count(), 0);
}
