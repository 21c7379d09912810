//! Main client implementation
//!
//! This module provides the [`DisClient`] that talks to the ingestion service:
//! batch and single-record writes with partial-failure retry, record reads,
//! stream management and transfer tasks.

pub mod backoff;
pub mod crypto;
pub mod resource;
pub mod retry;
pub mod transport;

use crate::client::crypto::{AesGcmCipher, PayloadCipher};
use crate::client::resource::Resource;
use crate::client::retry::{BatchSender, BatchWriteOutcome, BatchWriteRetryCoordinator};
use crate::client::transport::{EndpointKind, HttpTransport, Payload};
use crate::config::DisConfiguration;
use crate::error::DisError;
use crate::model::{
    Acknowledged, CreateStreamRequest, CreateStreamResult, CreateTransferTaskRequest,
    DeleteStreamRequest, DeleteStreamResult, DescribeStreamRequest, DescribeStreamResult,
    GetPartitionCursorRequest, GetPartitionCursorResult, GetRecordsRequest, GetRecordsResult,
    ListStreamsRequest, ListStreamsResult, PutRecordRequest, PutRecordResult, PutRecordsRequest,
    PutRecordsResult,
};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the DIS ingestion service
///
/// Cheap to clone; clones share the transport and the batch-write retry lock,
/// so concurrent retries through any clone serialize their backoff sleeps.
///
/// # Example
///
/// ```no_run
/// use dis_ingest_sdk::{DisClient, DisConfiguration};
/// use dis_ingest_sdk::model::{PutRecordsRequest, PutRecordsRequestEntry};
///
/// # async fn example() -> Result<(), dis_ingest_sdk::DisError> {
/// let config = DisConfiguration::new(
///     "https://dis.cn-north-1.myhuaweicloud.com".to_string(),
///     "cn-north-1".to_string(),
///     "my_project".to_string(),
/// );
/// let client = DisClient::new(config)?;
///
/// let request = PutRecordsRequest::new(
///     "my_stream",
///     vec![PutRecordsRequestEntry::new(b"hello".to_vec())],
/// );
/// let result = client.put_records(request).await?;
/// if result.failed_record_count > 0 {
///     // inspect result.records for error codes
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DisClient {
    config: Arc<DisConfiguration>,
    transport: HttpTransport,
    coordinator: BatchWriteRetryCoordinator,
    cipher: Option<Arc<dyn PayloadCipher>>,
}

impl DisClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid or the HTTP
    /// client can not be built.
    pub fn new(config: DisConfiguration) -> Result<Self, DisError> {
        config.validate()?;

        let cipher: Option<Arc<dyn PayloadCipher>> = match &config.data_password {
            Some(password) if config.is_encryption_active() => {
                Some(Arc::new(AesGcmCipher::new(password.clone())?))
            }
            _ => None,
        };

        let coordinator =
            BatchWriteRetryCoordinator::new(config.records_retries, config.backoff_policy());

        info!(
            "Initializing DisClient for region {} (endpoint: {}, manager endpoint: {}, records retries: {}, encryption: {})",
            config.region,
            config.endpoint,
            config.effective_manager_endpoint(),
            config.records_retries,
            cipher.is_some()
        );

        let config = Arc::new(config);
        Ok(Self {
            transport: HttpTransport::new(Arc::clone(&config))?,
            config,
            coordinator,
            cipher,
        })
    }

    /// Replace the payload cipher (e.g. with an externally managed key)
    pub fn with_cipher(mut self, cipher: Arc<dyn PayloadCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Replace the batch-write retry coordinator
    ///
    /// Use this to share one retry lock between several clients.
    pub fn with_coordinator(mut self, coordinator: BatchWriteRetryCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn config(&self) -> &DisConfiguration {
        &self.config
    }

    pub fn coordinator(&self) -> &BatchWriteRetryCoordinator {
        &self.coordinator
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Write a batch of records, retrying the ones that fail
    ///
    /// Callers must check `failed_record_count` to learn whether every record
    /// was written; use [`DisClient::put_records_with_outcome`] to also learn why
    /// retrying stopped.
    pub async fn put_records(
        &self,
        request: PutRecordsRequest,
    ) -> Result<PutRecordsResult, DisError> {
        Ok(self.put_records_with_outcome(request).await?.into_result())
    }

    /// Write a batch of records and return the detailed retry outcome
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if the batch is empty or the stream name is empty
    /// - `EncryptionError` if a payload can not be encrypted
    /// - any error of the first send attempt
    pub async fn put_records_with_outcome(
        &self,
        request: PutRecordsRequest,
    ) -> Result<BatchWriteOutcome, DisError> {
        self.put_records_via(&self.transport, request).await
    }

    /// Same as [`DisClient::put_records_with_outcome`], sending through `sender`
    pub async fn put_records_via<S>(
        &self,
        sender: &S,
        request: PutRecordsRequest,
    ) -> Result<BatchWriteOutcome, DisError>
    where
        S: BatchSender + ?Sized,
    {
        if request.stream_name.trim().is_empty() {
            return Err(DisError::InvalidRequest(
                "stream_name can not be empty".to_string(),
            ));
        }

        let PutRecordsRequest {
            stream_name,
            mut records,
        } = request;

        // Encrypted once here, so retries resend the same ciphertext
        if let Some(cipher) = &self.cipher {
            for record in &mut records {
                record.data = cipher.encrypt(&record.data)?;
            }
        }

        debug!("Putting {} records to stream {}", records.len(), stream_name);
        self.coordinator
            .submit_with_retry(sender, &stream_name, &records)
            .await
    }

    /// Write a single record
    ///
    /// Goes through the same retry path as a one-record batch.
    ///
    /// # Errors
    ///
    /// Returns `RecordRejected` if the record still failed when retrying stopped,
    /// or any error of [`DisClient::put_records_with_outcome`].
    pub async fn put_record(&self, request: PutRecordRequest) -> Result<PutRecordResult, DisError> {
        let outcome = self.put_records_with_outcome(request.into_batch()).await?;
        let entry = outcome.records.into_iter().next().ok_or_else(|| {
            DisError::InvalidResponse("no result for the submitted record".to_string())
        })?;

        if entry.is_failure() {
            return Err(DisError::RecordRejected {
                error_code: entry.error_code.unwrap_or_default(),
                error_message: entry.error_message.unwrap_or_default(),
            });
        }

        Ok(PutRecordResult {
            partition_id: entry.partition_id,
            sequence_number: entry.sequence_number,
        })
    }

    /// Get a cursor to read a partition from
    pub async fn get_partition_cursor(
        &self,
        request: GetPartitionCursorRequest,
    ) -> Result<GetPartitionCursorResult, DisError> {
        self.transport
            .request(
                Method::GET,
                EndpointKind::Data,
                vec![Resource::Cursors],
                Payload::Query(&request),
            )
            .await
    }

    /// Read records at a partition cursor
    ///
    /// Record payloads are decrypted when encryption is configured.
    pub async fn get_records(&self, request: GetRecordsRequest) -> Result<GetRecordsResult, DisError> {
        let mut result: GetRecordsResult = self
            .transport
            .request(
                Method::GET,
                EndpointKind::Data,
                vec![Resource::Records],
                Payload::Query(&request),
            )
            .await?;

        if let Some(cipher) = &self.cipher {
            for record in &mut result.records {
                record.data = cipher.decrypt(&record.data)?;
            }
        }

        Ok(result)
    }

    pub async fn create_stream(
        &self,
        request: CreateStreamRequest,
    ) -> Result<CreateStreamResult, DisError> {
        info!(
            "Creating stream {} with {} partitions",
            request.stream_name, request.partition_count
        );
        self.transport
            .request(
                Method::POST,
                EndpointKind::Manager,
                vec![Resource::Streams(None)],
                Payload::Json(&request),
            )
            .await
    }

    pub async fn describe_stream(
        &self,
        request: DescribeStreamRequest,
    ) -> Result<DescribeStreamResult, DisError> {
        self.transport
            .request(
                Method::GET,
                EndpointKind::Manager,
                vec![Resource::Streams(Some(request.stream_name.clone()))],
                Payload::Query(&request),
            )
            .await
    }

    pub async fn delete_stream(
        &self,
        request: DeleteStreamRequest,
    ) -> Result<DeleteStreamResult, DisError> {
        info!("Deleting stream {}", request.stream_name);
        self.transport
            .request(
                Method::DELETE,
                EndpointKind::Manager,
                vec![Resource::Streams(Some(request.stream_name))],
                Payload::<()>::None,
            )
            .await
    }

    pub async fn list_streams(
        &self,
        request: ListStreamsRequest,
    ) -> Result<ListStreamsResult, DisError> {
        self.transport
            .request(
                Method::GET,
                EndpointKind::Manager,
                vec![Resource::Streams(None)],
                Payload::Query(&request),
            )
            .await
    }

    /// Create a task dumping the stream into another storage service
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if no destination descriptor is set.
    pub async fn create_transfer_task(
        &self,
        request: CreateTransferTaskRequest,
    ) -> Result<Acknowledged, DisError> {
        request.validate()?;
        self.transport
            .request(
                Method::POST,
                EndpointKind::Manager,
                vec![
                    Resource::Streams(Some(request.stream_name.clone())),
                    Resource::TransferTasks(None),
                ],
                Payload::Json(&request),
            )
            .await
    }
}

impl std::fmt::Debug for DisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisClient")
            .field("region", &self.config.region)
            .field("endpoint", &self.config.endpoint)
            .field("coordinator", &self.coordinator)
            .field("encryption", &self.cipher.is_some())
            .finish()
    }
}
