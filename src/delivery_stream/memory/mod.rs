//! In-memory implementation of a DeliveryStream.
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use crate::{
    error::{FirehoseError, FirehoseResult},
    messages::{PutRecordBatchRequest, PutRecordBatchResponse, PutRecordBatchResponseEntry},
};

use super::{DeliveryStream, MAX_BYTES_PER_CALL, MAX_BYTES_PER_RECORD, MAX_RECORDS_PER_CALL};

/// A record accepted by an [`InMemoryDeliveryStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredRecord {
    /// The ID assigned on acceptance.
    pub record_id: String,
    /// The payload of the record.
    pub data: Bytes,
}

/// The InMemoryDeliveryStream is a default implementation that is
///
/// - Single process, nothing is persisted.
/// - Enforcing the per-call and per-record service limits.
/// - Able to pause a stream, which fails every call to it as unavailable.
#[derive(Debug, Default)]
pub struct InMemoryDeliveryStream {
    streams: DashMap<String, Vec<DeliveredRecord>>,
    paused: DashSet<String>,
}

impl InMemoryDeliveryStream {
    /// Creates a new instance with no delivery streams.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the named delivery stream. Creating an existing stream keeps its records.
    pub fn create_delivery_stream(&self, name: impl Into<String>) {
        self.streams.entry(name.into()).or_default();
    }

    /// Pauses the named stream. Until it is resumed, every call to it fails with
    /// [`FirehoseError::ServiceUnavailable`] and no record is accepted.
    pub fn pause_delivery_stream(&self, name: impl Into<String>) {
        self.paused.insert(name.into());
    }

    /// Resumes a paused stream.
    pub fn resume_delivery_stream(&self, name: &str) {
        self.paused.remove(name);
    }

    /// Returns a snapshot of the records accepted by the named stream, in arrival order.
    pub fn delivered(&self, name: &str) -> Option<Vec<DeliveredRecord>> {
        self.streams.get(name).map(|records| records.value().clone())
    }

    fn check_limits(request: &PutRecordBatchRequest) -> FirehoseResult<()> {
        if request.records.is_empty() {
            return Err(FirehoseError::InvalidArgument(
                "Records must contain at least 1 record".to_string(),
            ));
        }

        if request.records.len() > MAX_RECORDS_PER_CALL {
            return Err(FirehoseError::InvalidArgument(format!(
                "Records contains {} records, the limit is {MAX_RECORDS_PER_CALL}",
                request.records.len()
            )));
        }

        let size = request.size();
        if size > MAX_BYTES_PER_CALL {
            return Err(FirehoseError::InvalidArgument(format!(
                "Records total {size} bytes, the limit is {MAX_BYTES_PER_CALL}"
            )));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl DeliveryStream for InMemoryDeliveryStream {
    #[tracing::instrument(skip_all, name = "in_memory_put_record_batch")]
    async fn put_record_batch(
        &self,
        request: PutRecordBatchRequest,
    ) -> FirehoseResult<PutRecordBatchResponse> {
        Self::check_limits(&request)?;

        if self.paused.contains(&request.delivery_stream_name) {
            return Err(FirehoseError::ServiceUnavailable(format!(
                "Delivery stream {} is paused",
                request.delivery_stream_name
            )));
        }

        let mut stream = self
            .streams
            .get_mut(&request.delivery_stream_name)
            .ok_or_else(|| FirehoseError::ResourceNotFound(request.delivery_stream_name.clone()))?;

        let mut entries = Vec::with_capacity(request.records.len());

        for record in request.records {
            if record.len() > MAX_BYTES_PER_RECORD {
                entries.push(PutRecordBatchResponseEntry::failure(
                    "ValidationException",
                    format!(
                        "Record size {} exceeds the limit of {MAX_BYTES_PER_RECORD} bytes",
                        record.len()
                    ),
                ));
                continue;
            }

            let record_id = Uuid::new_v4().to_string();

            stream.push(DeliveredRecord {
                record_id: record_id.clone(),
                data: record.data,
            });

            entries.push(PutRecordBatchResponseEntry::success(record_id));
        }

        tracing::debug!("Accepted {} records.", entries.len());

        Ok(entries.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Record;
    use tracing_test::traced_test;

    fn request(name: &str, records: Vec<Record>) -> PutRecordBatchRequest {
        PutRecordBatchRequest {
            delivery_stream_name: name.to_string(),
            records,
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_accepts_records_in_order() {
        let stream = InMemoryDeliveryStream::new();
        stream.create_delivery_stream("stream");

        let response = stream
            .put_record_batch(request("stream", vec!["a".into(), "b".into()]))
            .await
            .expect("call succeeds");

        assert_eq!(response.failed_put_count, 0);
        assert_eq!(response.request_responses.len(), 2);

        let delivered = stream.delivered("stream").expect("stream exists");

        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].data, Bytes::from_static(b"a"));
        assert_eq!(delivered[1].data, Bytes::from_static(b"b"));
        assert_eq!(
            response.request_responses[0].record_id.as_deref(),
            Some(delivered[0].record_id.as_str())
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unknown_stream_fails_the_whole_call() {
        let stream = InMemoryDeliveryStream::new();

        let result = stream
            .put_record_batch(request("missing", vec!["a".into()]))
            .await;

        assert!(matches!(result, Err(FirehoseError::ResourceNotFound(name)) if name == "missing"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_too_many_records_fails_the_whole_call() {
        let stream = InMemoryDeliveryStream::new();
        stream.create_delivery_stream("stream");

        let records = (0..=MAX_RECORDS_PER_CALL)
            .map(|i| Record::from(i.to_string()))
            .collect();

        let result = stream.put_record_batch(request("stream", records)).await;

        assert!(matches!(result, Err(FirehoseError::InvalidArgument(_))));
        assert_eq!(stream.delivered("stream").map(|r| r.len()), Some(0));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_oversized_record_fails_individually() {
        let stream = InMemoryDeliveryStream::new();
        stream.create_delivery_stream("stream");

        let response = stream
            .put_record_batch(request(
                "stream",
                vec![
                    "small".into(),
                    Record::from(vec![0u8; MAX_BYTES_PER_RECORD + 1]),
                    "also small".into(),
                ],
            ))
            .await
            .expect("call succeeds");

        assert_eq!(response.failed_put_count, 1);
        assert!(response.request_responses[0].record_id.is_some());
        assert_eq!(
            response.request_responses[1].error_code.as_deref(),
            Some("ValidationException")
        );
        assert!(response.request_responses[2].record_id.is_some());
        assert_eq!(stream.delivered("stream").map(|r| r.len()), Some(2));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_paused_stream_is_unavailable_until_resumed() {
        let stream = InMemoryDeliveryStream::new();
        stream.create_delivery_stream("stream");
        stream.pause_delivery_stream("stream");

        let result = stream
            .put_record_batch(request("stream", vec!["a".into()]))
            .await;

        assert!(matches!(
            result,
            Err(FirehoseError::ServiceUnavailable(message)) if message == "Delivery stream stream is paused"
        ));
        assert_eq!(stream.delivered("stream").map(|r| r.len()), Some(0));

        stream.resume_delivery_stream("stream");

        let response = stream
            .put_record_batch(request("stream", vec!["a".into()]))
            .await
            .expect("call succeeds");

        assert_eq!(response.failed_put_count, 0);
        assert_eq!(stream.delivered("stream").map(|r| r.len()), Some(1));
    }
}
