//! Transfer (dump) task request types
//!
//! A transfer task continuously dumps a stream's data into another storage
//! service. OBS destinations are typed; the remaining destinations are passed
//! through as JSON objects.

use crate::error::DisError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerStrategy {
    Latest,
    TrimHorizon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationFileType {
    Text,
    Parquet,
    Carbon,
}

/// OBS destination of a transfer task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObsDestinationDescriptor {
    pub task_name: String,
    pub agency_name: String,
    /// Dump interval in seconds
    pub deliver_time_interval: u32,
    pub obs_bucket_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_strategy: Option<ConsumerStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_file_type: Option<DestinationFileType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_delimiter: Option<String>,
}

impl ObsDestinationDescriptor {
    pub fn new(
        task_name: impl Into<String>,
        agency_name: impl Into<String>,
        deliver_time_interval: u32,
        obs_bucket_path: impl Into<String>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            agency_name: agency_name.into(),
            deliver_time_interval,
            obs_bucket_path: obs_bucket_path.into(),
            consumer_strategy: None,
            file_prefix: None,
            partition_format: None,
            destination_file_type: None,
            record_delimiter: None,
        }
    }
}

/// Create transfer task request
///
/// `stream_name` is part of the resource path and is not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateTransferTaskRequest {
    #[serde(skip)]
    pub stream_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs_destination_descriptor: Option<ObsDestinationDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrs_destination_descriptor: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dli_destination_descriptor: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloudtable_destination_descriptor: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dws_destination_descriptor: Option<serde_json::Value>,
}

impl CreateTransferTaskRequest {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            ..Default::default()
        }
    }

    pub fn with_obs_destination(mut self, descriptor: ObsDestinationDescriptor) -> Self {
        self.obs_destination_descriptor = Some(descriptor);
        self
    }

    pub fn with_mrs_destination(mut self, descriptor: serde_json::Value) -> Self {
        self.mrs_destination_descriptor = Some(descriptor);
        self
    }

    pub fn with_dli_destination(mut self, descriptor: serde_json::Value) -> Self {
        self.dli_destination_descriptor = Some(descriptor);
        self
    }

    pub fn with_cloudtable_destination(mut self, descriptor: serde_json::Value) -> Self {
        self.cloudtable_destination_descriptor = Some(descriptor);
        self
    }

    pub fn with_dws_destination(mut self, descriptor: serde_json::Value) -> Self {
        self.dws_destination_descriptor = Some(descriptor);
        self
    }

    /// Check the request can be sent
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the stream name is empty or no destination is set.
    pub fn validate(&self) -> Result<(), DisError> {
        if self.stream_name.trim().is_empty() {
            return Err(DisError::InvalidRequest(
                "stream_name can not be empty".to_string(),
            ));
        }

        let has_destination = self.obs_destination_descriptor.is_some()
            || self.mrs_destination_descriptor.is_some()
            || self.dli_destination_descriptor.is_some()
            || self.cloudtable_destination_descriptor.is_some()
            || self.dws_destination_descriptor.is_some();
        if !has_destination {
            return Err(DisError::InvalidRequest(
                "a transfer task needs at least one destination descriptor".to_string(),
            ));
        }

        Ok(())
    }
}
