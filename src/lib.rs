//! DIS Ingest SDK
//!
//! Async Rust client for the DIS data-stream ingestion service.
//! Marshals typed requests into HTTP calls, decodes typed responses, and
//! retries the failed subset of batch writes with exponential backoff.
//!
//! # Features
//!
//! - Batch writes that resubmit only the records the service rejected
//! - Backoff sleeps serialized across concurrent callers of one client
//! - Single-record writes through the same retry path
//! - Optional AES-256-GCM encryption of record payloads
//! - Partition cursors and record reads
//! - Stream management and transfer (dump) tasks
//! - YAML and environment configuration loaders
//!
//! # Example
//!
//! ```no_run
//! use dis_ingest_sdk::{DisClient, DisConfiguration};
//! use dis_ingest_sdk::model::{PutRecordsRequest, PutRecordsRequestEntry};
//!
//! # async fn example() -> Result<(), dis_ingest_sdk::DisError> {
//! let config = dis_ingest_sdk::config::loader::load_from_env()?;
//! let client = DisClient::new(config)?;
//! let outcome = client
//!     .put_records_with_outcome(PutRecordsRequest::new(
//!         "my_stream",
//!         vec![PutRecordsRequestEntry::new(b"event".to_vec())],
//!     ))
//!     .await?;
//! println!("{} records failed ({:?})", outcome.failed_record_count, outcome.termination);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod observability;

pub use client::backoff::{BackoffPolicy, BackoffTimer};
pub use client::retry::{BatchSender, BatchWriteOutcome, BatchWriteRetryCoordinator, Termination};
pub use client::DisClient;
pub use config::{DisConfiguration, LoggingConfig};
pub use error::DisError;
