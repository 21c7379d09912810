//! Rust example for writing records with the DIS ingest SDK
//!
//! Reads configuration from `DIS_*` environment variables, writes a small
//! batch and reports which records still failed after retrying.
//!
//! ```text
//! DIS_ENDPOINT=https://dis.cn-north-1.myhuaweicloud.com \
//! DIS_REGION=cn-north-1 DIS_PROJECT_ID=my_project \
//! cargo run --example put_records -- my_stream
//! ```

use anyhow::Context;
use dis_ingest_sdk::config::loader::load_from_env;
use dis_ingest_sdk::model::{PutRecordsRequest, PutRecordsRequestEntry};
use dis_ingest_sdk::observability::init_tracing;
use dis_ingest_sdk::{DisClient, Termination};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let stream_name = env::args().nth(1).unwrap_or_else(|| "my_stream".to_string());

    let config = load_from_env().context("loading DIS configuration from environment")?;
    init_tracing(&config.logging)?;

    let client = DisClient::new(config)?;

    let records: Vec<_> = (0..10)
        .map(|i| {
            PutRecordsRequestEntry::new(format!(r#"{{"id":{},"event":"click"}}"#, i).into_bytes())
                .with_partition_key(format!("user-{}", i % 4))
        })
        .collect();

    println!("Writing {} records to {}...", records.len(), stream_name);
    let outcome = client
        .put_records_with_outcome(PutRecordsRequest::new(stream_name.as_str(), records))
        .await
        .with_context(|| format!("writing to stream {}", stream_name))?;

    println!(
        "Attempts: {}, success rate: {:.1}%",
        outcome.attempts,
        outcome.success_rate() * 100.0
    );

    match &outcome.termination {
        Termination::Completed => println!("All records written"),
        Termination::RetriesExhausted | Termination::BackoffExpired => {
            for (code, indices) in outcome.group_failures_by_code() {
                println!("{} records failed with {}: {:?}", indices.len(), code, indices);
            }
        }
        Termination::TransportInterrupted(e) => {
            println!(
                "Retry interrupted ({}), records {:?} not confirmed",
                e,
                outcome.failed_record_indices()
            );
        }
    }

    Ok(())
}
