//! Mock batch sender
//!
//! Scripted implementation of `BatchSender` that records every request it
//! receives and when it received it.

use async_trait::async_trait;
use dis_ingest_sdk::model::{PutRecordsRequestEntry, PutRecordsResult};
use dis_ingest_sdk::{BatchSender, DisError};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

type Script = Box<
    dyn FnMut(usize, &[PutRecordsRequestEntry]) -> Result<PutRecordsResult, DisError> + Send,
>;

struct Call {
    at: Instant,
    stream_name: String,
    records: Vec<PutRecordsRequestEntry>,
}

/// Sender whose answers come from a closure of `(attempt, records)`
pub struct ScriptedSender {
    script: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedSender {
    pub fn new<F>(script: F) -> Self
    where
        F: FnMut(usize, &[PutRecordsRequestEntry]) -> Result<PutRecordsResult, DisError>
            + Send
            + 'static,
    {
        Self {
            script: Mutex::new(Box::new(script)),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<Vec<PutRecordsRequestEntry>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.records.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn streams(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.stream_name.clone())
            .collect()
    }

    /// Time between consecutive requests
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect()
    }
}

#[async_trait]
impl BatchSender for ScriptedSender {
    async fn send(
        &self,
        stream_name: &str,
        records: &[PutRecordsRequestEntry],
    ) -> Result<PutRecordsResult, DisError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                at: Instant::now(),
                stream_name: stream_name.to_string(),
                records: records.to_vec(),
            });
            calls.len() - 1
        };
        let mut script = self.script.lock().unwrap();
        (*script)(attempt, records)
    }
}
