//! Request and response types of the DIS REST API

pub mod records;
pub mod stream;
pub mod transfer_task;

pub use records::{
    CursorType, GetPartitionCursorRequest, GetPartitionCursorResult, GetRecordsRequest,
    GetRecordsResult, PutRecordRequest, PutRecordResult, PutRecordsRequest,
    PutRecordsRequestEntry, PutRecordsResult, PutRecordsResultEntry, Record,
};
pub use stream::{
    Acknowledged, CreateStreamRequest, CreateStreamResult, DataType, DeleteStreamRequest,
    DeleteStreamResult, DescribeStreamRequest, DescribeStreamResult, ListStreamsRequest,
    ListStreamsResult, PartitionResult, StreamType,
};
pub use transfer_task::{
    ConsumerStrategy, CreateTransferTaskRequest, DestinationFileType, ObsDestinationDescriptor,
};
