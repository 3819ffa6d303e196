//! The write API that batches are submitted to.

pub mod memory;

use crate::{
    error::FirehoseResult,
    messages::{PutRecordBatchRequest, PutRecordBatchResponse},
};

/// Maximum number of records a single `PutRecordBatch` call accepts.
pub const MAX_RECORDS_PER_CALL: usize = 500;
/// Maximum total payload of a single `PutRecordBatch` call, in bytes.
pub const MAX_BYTES_PER_CALL: usize = 4 * 1024 * 1024;
/// Maximum payload of a single record, in bytes.
pub const MAX_BYTES_PER_RECORD: usize = 1000 * 1024;

/// The DeliveryStream trait.
///
/// This is the batch-oriented, partially failable write API that the pipeline feeds.
/// It is designed to be reimplementable: wrap a real service client, or use
/// [`memory::InMemoryDeliveryStream`] for local runs and tests.
///
/// The pipeline may call `put_record_batch` for several batches concurrently, so
/// implementations must be safe to share between tasks.
#[async_trait::async_trait]
pub trait DeliveryStream
where
    Self: Send + Sync + std::fmt::Debug,
{
    /// Writes a batch of records in a single call.
    ///
    /// On success the response holds exactly one entry per record of the request, in the
    /// same order, each either carrying the assigned record ID or an error code and message.
    ///
    /// # Errors
    /// Returns an error if the call failed as a whole and no per-record result is known.
    async fn put_record_batch(
        &self,
        request: PutRecordBatchRequest,
    ) -> FirehoseResult<PutRecordBatchResponse>;
}
