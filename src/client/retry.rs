//! Partial-failure retry for batch writes
//!
//! A batch write can succeed for some records and fail for others. The
//! [`BatchWriteRetryCoordinator`] resubmits only the failed subset, with
//! exponential backoff between attempts, and rebuilds one result per original
//! record.
//!
//! # Lock granularity
//!
//! Backoff sleeps are serialized by one lock per coordinator instance (not per
//! stream). Two concurrent calls on the same client, even for different
//! streams, wait for each other's backoff. The lock is held only while the
//! backoff bookkeeping runs and the call sleeps, never across a send. Share a
//! lock between coordinators with [`BatchWriteRetryCoordinator::with_retry_lock`].

use crate::client::backoff::{BackoffPolicy, BackoffTimer};
use crate::error::DisError;
use crate::model::{PutRecordsRequestEntry, PutRecordsResult, PutRecordsResultEntry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, trace};

/// Error code placed in a result slot that never received an answer
pub const UNACKNOWLEDGED_ERROR_CODE: &str = "DIS.CLIENT.UNACKNOWLEDGED";

/// Sends one batch-write request
///
/// Implementations return one result entry per submitted record, in order, or
/// an error when the whole request failed.
#[async_trait]
pub trait BatchSender: Send + Sync {
    async fn send(
        &self,
        stream_name: &str,
        records: &[PutRecordsRequestEntry],
    ) -> Result<PutRecordsResult, DisError>;
}

/// Why the retry loop stopped
#[derive(Debug, Clone)]
pub enum Termination {
    /// Every record succeeded
    Completed,
    /// The retry ceiling was reached with records still failing
    RetriesExhausted,
    /// The backoff timer's elapsed-time budget ran out
    BackoffExpired,
    /// A retry attempt failed as a whole; results are the last known snapshot
    TransportInterrupted(DisError),
}

/// Result of [`BatchWriteRetryCoordinator::submit_with_retry`]
///
/// `records[i]` is the latest result observed for input record `i`.
#[derive(Debug, Clone)]
pub struct BatchWriteOutcome {
    pub records: Vec<PutRecordsResultEntry>,
    /// Number of records whose latest result is a failure
    pub failed_record_count: usize,
    /// Number of send calls made, including one that failed as a whole
    pub attempts: u32,
    pub termination: Termination,
}

impl BatchWriteOutcome {
    /// Check if every record succeeded
    pub fn is_complete(&self) -> bool {
        self.failed_record_count == 0
    }

    /// Error that cut the retries short, if any
    pub fn interrupted_by(&self) -> Option<&DisError> {
        match &self.termination {
            Termination::TransportInterrupted(e) => Some(e),
            _ => None,
        }
    }

    /// Get indices of records whose latest result is a failure
    pub fn failed_record_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_failure())
            .map(|(i, _)| i)
            .collect()
    }

    /// Get indices of records that succeeded
    pub fn successful_record_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_success())
            .map(|(i, _)| i)
            .collect()
    }

    /// Group failed records by error code
    ///
    /// # Returns
    ///
    /// Returns a HashMap where keys are error codes (e.g., "DIS.4303")
    /// and values are the indices of records that failed with that code.
    pub fn group_failures_by_code(&self) -> HashMap<String, Vec<usize>> {
        let mut grouped: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, record) in self.records.iter().enumerate() {
            if let Some(code) = record.error_code.as_ref().filter(|c| !c.is_empty()) {
                grouped.entry(code.clone()).or_default().push(idx);
            }
        }
        grouped
    }

    /// Fraction of records that succeeded (0.0 for an empty outcome)
    pub fn success_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        (self.records.len() - self.failed_record_count) as f64 / self.records.len() as f64
    }

    /// Flatten into the plain batch-write response shape
    pub fn into_result(self) -> PutRecordsResult {
        PutRecordsResult {
            failed_record_count: self.failed_record_count,
            records: self.records,
        }
    }
}

/// Per-call bookkeeping
///
/// `pending` holds original indices; the request of each retry is built from it,
/// so position `i` of a response always maps back to `pending[i]`.
struct RetryState<'a> {
    records: &'a [PutRecordsRequestEntry],
    slots: Vec<Option<PutRecordsResultEntry>>,
    pending: Vec<usize>,
}

impl<'a> RetryState<'a> {
    fn new(records: &'a [PutRecordsRequestEntry]) -> Self {
        Self {
            records,
            slots: vec![None; records.len()],
            pending: (0..records.len()).collect(),
        }
    }

    fn batch_for(&self, submitted: &[usize]) -> Vec<PutRecordsRequestEntry> {
        submitted.iter().map(|&i| self.records[i].clone()).collect()
    }

    /// Store one attempt's results and recompute the pending list
    ///
    /// Returns the number of records still failing. A slot already holding a
    /// success is never overwritten.
    fn absorb(&mut self, submitted: &[usize], results: Vec<PutRecordsResultEntry>) -> usize {
        let mut still_failing = Vec::new();
        for (&original_index, entry) in submitted.iter().zip(results) {
            let slot = &mut self.slots[original_index];
            if slot.as_ref().is_some_and(PutRecordsResultEntry::is_success) {
                continue;
            }
            if entry.is_failure() {
                still_failing.push(original_index);
            }
            *slot = Some(entry);
        }
        self.pending = still_failing;
        self.pending.len()
    }

    fn into_outcome(self, attempts: u32, termination: Termination) -> BatchWriteOutcome {
        let records: Vec<PutRecordsResultEntry> = self
            .slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    PutRecordsResultEntry::failure(
                        UNACKNOWLEDGED_ERROR_CODE,
                        "record was never acknowledged by the service",
                    )
                })
            })
            .collect();
        let failed_record_count = records.iter().filter(|r| r.is_failure()).count();
        BatchWriteOutcome {
            records,
            failed_record_count,
            attempts,
            termination,
        }
    }
}

fn check_response_len(result: PutRecordsResult, expected: usize) -> Result<PutRecordsResult, DisError> {
    if result.records.len() != expected {
        return Err(DisError::InvalidResponse(format!(
            "sent {} records but received {} results",
            expected,
            result.records.len()
        )));
    }
    Ok(result)
}

/// Resubmits failed records of a batch write with exponential backoff
#[derive(Debug, Clone)]
pub struct BatchWriteRetryCoordinator {
    max_retries: u32,
    backoff: BackoffPolicy,
    retry_lock: Arc<Mutex<()>>,
}

impl BatchWriteRetryCoordinator {
    /// Create a coordinator with its own retry lock
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Additional attempts after the first (0 disables retry)
    /// * `backoff` - Backoff profile used between attempts
    pub fn new(max_retries: u32, backoff: BackoffPolicy) -> Self {
        Self {
            max_retries,
            backoff,
            retry_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Use `lock` to serialize backoff sleeps instead of a private lock
    pub fn with_retry_lock(mut self, lock: Arc<Mutex<()>>) -> Self {
        self.retry_lock = lock;
        self
    }

    pub fn retry_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.retry_lock)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_policy(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Submit `records` and retry the failed subset until all succeed or the
    /// ceiling is reached
    ///
    /// # Returns
    ///
    /// Returns a `BatchWriteOutcome` aligned with `records`. Check
    /// `failed_record_count` (or `termination`) to learn whether every record
    /// was written.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `records` is empty
    /// - any error of the first send, unchanged; errors of later sends end the
    ///   loop with `Termination::TransportInterrupted` instead
    pub async fn submit_with_retry<S>(
        &self,
        sender: &S,
        stream_name: &str,
        records: &[PutRecordsRequestEntry],
    ) -> Result<BatchWriteOutcome, DisError>
    where
        S: BatchSender + ?Sized,
    {
        if records.is_empty() {
            return Err(DisError::InvalidRequest(
                "a batch write needs at least one record".to_string(),
            ));
        }

        let mut state = RetryState::new(records);
        let mut timer: Option<BackoffTimer> = None;
        let mut attempt: u32 = 0;
        let mut attempts_made: u32 = 0;
        let mut last_submitted = records.len();
        let mut last_failed = 0usize;

        let termination = loop {
            if attempt > 0 {
                let guard = self.retry_lock.lock().await;
                trace!("Put records retry lock acquired");

                let timer = timer.get_or_insert_with(|| self.backoff.start());
                if last_failed != last_submitted {
                    // Partial progress: retry sooner
                    timer.reset();
                }

                let Some(sleep_for) = timer.next_backoff() else {
                    debug!(
                        "Backoff budget for stream {} spent after {:?}, {} records still failing",
                        stream_name,
                        timer.elapsed(),
                        last_failed
                    );
                    break Termination::BackoffExpired;
                };

                debug!(
                    "Put {} records but {} failed, will retry after backoff {} ms, current retry count is {}",
                    last_submitted,
                    last_failed,
                    sleep_for.as_millis(),
                    attempt
                );
                tokio::time::sleep(sleep_for).await;

                drop(guard);
                trace!("Put records retry lock released");
            }

            let submitted = state.pending.clone();
            attempts_made += 1;
            let sent = if attempt == 0 {
                sender.send(stream_name, records).await
            } else {
                let batch = state.batch_for(&submitted);
                sender.send(stream_name, &batch).await
            };

            let response = match sent.and_then(|r| check_response_len(r, submitted.len())) {
                Ok(response) => response,
                Err(e) if attempt == 0 => return Err(e),
                Err(e) => {
                    error!(
                        "Put records retry {} to stream {} failed, returning partial results: {}",
                        attempt, stream_name, e
                    );
                    break Termination::TransportInterrupted(e);
                }
            };

            last_submitted = submitted.len();
            last_failed = state.absorb(&submitted, response.records);

            if last_failed == 0 {
                break Termination::Completed;
            }
            if attempt >= self.max_retries {
                break Termination::RetriesExhausted;
            }
            attempt += 1;
        };

        Ok(state.into_outcome(attempts_made, termination))
    }
}
