//! Stream management request/response types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamType {
    Common,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Blob,
    Json,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateStreamRequest {
    pub stream_name: String,
    pub partition_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<StreamType>,
    /// Retention in hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

impl CreateStreamRequest {
    pub fn new(stream_name: impl Into<String>, partition_count: u32) -> Self {
        Self {
            stream_name: stream_name.into(),
            partition_count,
            stream_type: None,
            data_duration: None,
            data_type: None,
        }
    }

    pub fn with_stream_type(mut self, stream_type: StreamType) -> Self {
        self.stream_type = Some(stream_type);
        self
    }

    pub fn with_data_duration(mut self, hours: u32) -> Self {
        self.data_duration = Some(hours);
        self
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }
}

/// Empty acknowledgement returned by create/delete operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledged {}

pub type CreateStreamResult = Acknowledged;
pub type DeleteStreamResult = Acknowledged;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescribeStreamRequest {
    #[serde(skip)]
    pub stream_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_partition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_partitions: Option<u32>,
}

impl DescribeStreamRequest {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            start_partition_id: None,
            limit_partitions: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartitionResult {
    pub partition_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub hash_range: Option<String>,
    #[serde(default)]
    pub sequence_number_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DescribeStreamResult {
    pub stream_name: String,
    #[serde(default)]
    pub create_time: Option<i64>,
    #[serde(default)]
    pub last_modified_time: Option<i64>,
    /// Retention in hours
    #[serde(default)]
    pub retention_period: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stream_type: Option<StreamType>,
    #[serde(default)]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub partitions: Vec<PartitionResult>,
    #[serde(default)]
    pub has_more_partitions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStreamRequest {
    pub stream_name: String,
}

impl DeleteStreamRequest {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListStreamsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_stream_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListStreamsResult {
    #[serde(default)]
    pub total_number: u32,
    #[serde(default)]
    pub stream_names: Vec<String>,
    #[serde(default)]
    pub has_more_streams: bool,
}
