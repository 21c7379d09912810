//! Record, cursor and batch-write request/response types

use serde::{Deserialize, Serialize};

/// One record of a batch write
///
/// Identified only by its position in the submitted sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRecordsRequestEntry {
    /// Record payload (base64 on the wire)
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_hash_key: Option<String>,
    /// Record timestamp in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl PutRecordsRequestEntry {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            partition_key: None,
            partition_id: None,
            explicit_hash_key: None,
            timestamp: None,
        }
    }

    pub fn with_partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    pub fn with_partition_id(mut self, partition_id: impl Into<String>) -> Self {
        self.partition_id = Some(partition_id.into());
        self
    }

    /// Route the record by an explicit hash value instead of its partition key
    pub fn with_explicit_hash_key(mut self, hash_key: impl Into<String>) -> Self {
        self.explicit_hash_key = Some(hash_key.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Batch write request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRecordsRequest {
    pub stream_name: String,
    pub records: Vec<PutRecordsRequestEntry>,
}

impl PutRecordsRequest {
    pub fn new(stream_name: impl Into<String>, records: Vec<PutRecordsRequestEntry>) -> Self {
        Self {
            stream_name: stream_name.into(),
            records,
        }
    }
}

/// Per-record outcome of a batch write
///
/// A present, non-empty `error_code` marks the record as failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRecordsResultEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PutRecordsResultEntry {
    /// Successful entry
    pub fn success(partition_id: impl Into<String>, sequence_number: impl Into<String>) -> Self {
        Self {
            partition_id: Some(partition_id.into()),
            sequence_number: Some(sequence_number.into()),
            ..Default::default()
        }
    }

    /// Failed entry
    pub fn failure(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_code: Some(error_code.into()),
            error_message: Some(error_message.into()),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_code.as_deref().map_or(true, str::is_empty)
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }
}

/// Batch write response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRecordsResult {
    #[serde(default)]
    pub failed_record_count: usize,
    #[serde(default)]
    pub records: Vec<PutRecordsResultEntry>,
}

impl PutRecordsResult {
    /// Number of entries carrying an error code
    ///
    /// Counted from the entries rather than trusting `failed_record_count`.
    pub fn count_failures(&self) -> usize {
        self.records.iter().filter(|r| r.is_failure()).count()
    }
}

/// Single record write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordRequest {
    pub stream_name: String,
    pub data: Vec<u8>,
    pub partition_key: Option<String>,
    pub timestamp: Option<i64>,
}

impl PutRecordRequest {
    pub fn new(stream_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            stream_name: stream_name.into(),
            data: data.into(),
            partition_key: None,
            timestamp: None,
        }
    }

    pub fn with_partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// One-record batch equivalent
    pub fn into_batch(self) -> PutRecordsRequest {
        let entry = PutRecordsRequestEntry {
            data: self.data,
            partition_key: self.partition_key,
            partition_id: None,
            explicit_hash_key: None,
            timestamp: self.timestamp,
        };
        PutRecordsRequest::new(self.stream_name, vec![entry])
    }
}

/// Single record write response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordResult {
    pub partition_id: Option<String>,
    pub sequence_number: Option<String>,
}

/// Where a partition cursor starts reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CursorType {
    AtSequenceNumber,
    AfterSequenceNumber,
    TrimHorizon,
    Latest,
    AtTimestamp,
}

/// Partition cursor request, sent as a query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetPartitionCursorRequest {
    pub stream_name: String,
    pub partition_id: String,
    pub cursor_type: CursorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_sequence_number: Option<String>,
    /// Epoch milliseconds, used with `CursorType::AtTimestamp`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl GetPartitionCursorRequest {
    pub fn new(
        stream_name: impl Into<String>,
        partition_id: impl Into<String>,
        cursor_type: CursorType,
    ) -> Self {
        Self {
            stream_name: stream_name.into(),
            partition_id: partition_id.into(),
            cursor_type,
            starting_sequence_number: None,
            timestamp: None,
        }
    }

    pub fn with_starting_sequence_number(mut self, sequence_number: impl Into<String>) -> Self {
        self.starting_sequence_number = Some(sequence_number.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GetPartitionCursorResult {
    pub partition_cursor: String,
}

/// Record download request, sent as a query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetRecordsRequest {
    pub partition_cursor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fetch_bytes: Option<u64>,
}

impl GetRecordsRequest {
    pub fn new(partition_cursor: impl Into<String>) -> Self {
        Self {
            partition_cursor: partition_cursor.into(),
            max_fetch_bytes: None,
        }
    }
}

/// A record read back from a partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub partition_key: Option<String>,
    pub sequence_number: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub timestamp_type: Option<String>,
}

impl Record {
    /// Record timestamp as a UTC datetime
    pub fn timestamp_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.timestamp
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GetRecordsResult {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub next_partition_cursor: Option<String>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
