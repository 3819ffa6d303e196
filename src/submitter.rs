//! Submission of batches and reconciliation of their outcomes onto records.
//!
//! Each batch is written with exactly one `PutRecordBatch` call. Whatever that call returns is
//! expanded into one [`RecordOutcome`] per record of the batch, in batch order. A call that
//! fails as a whole becomes an `InternalFailure` error for every record, so a failing batch
//! never ends the stream.
use std::sync::Arc;

use futures::{Stream, StreamExt, stream};

use crate::{
    delivery_stream::DeliveryStream,
    error::{FirehoseError, FirehoseResult},
    messages::{
        PutRecordBatchRequest, PutRecordBatchResponse, PutRecordBatchResponseEntry,
        PutRecordError, PutRecordResult, Record, RecordOutcome,
    },
};

/// Lifecycle of a single batch.
///
/// A batch moves forward only: `Pending` to `AwaitingResult`, then into one of the two
/// terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Formed, not yet submitted.
    Pending,
    /// The call has been issued.
    AwaitingResult,
    /// The call returned per-record results that were paired with the records.
    PartialReconciled,
    /// The call failed as a whole and every record was given a synthesized error.
    WholeFailureReconciled,
}

/// Submits every batch of `batches` to `delivery_stream` and flattens the results.
///
/// Up to `max_in_flight` calls run at once. Outcomes are still emitted batch by batch in
/// submission order, and the outcomes of one batch are never interleaved with another's.
pub fn submit_batches<B>(
    batches: B,
    delivery_stream: Arc<dyn DeliveryStream>,
    delivery_stream_name: impl Into<Arc<str>>,
    max_in_flight: usize,
) -> impl Stream<Item = RecordOutcome>
where
    B: Stream<Item = Vec<Record>>,
{
    let delivery_stream_name = delivery_stream_name.into();

    batches
        .map(move |records| {
            let delivery_stream = delivery_stream.clone();
            let delivery_stream_name = delivery_stream_name.clone();

            async move { submit_batch(delivery_stream.as_ref(), &delivery_stream_name, records).await }
        })
        .buffered(max_in_flight.max(1))
        .flat_map(stream::iter)
}

/// Submits one batch with a single `PutRecordBatch` call and reconciles the outcome.
///
/// Always returns exactly one outcome per record, in the order of `records`.
#[tracing::instrument(skip_all, name = "submit_batch", fields(size = records.len()))]
pub async fn submit_batch(
    delivery_stream: &dyn DeliveryStream,
    delivery_stream_name: &str,
    records: Vec<Record>,
) -> Vec<RecordOutcome> {
    tracing::trace!(state = ?BatchState::Pending);

    let request = PutRecordBatchRequest {
        delivery_stream_name: delivery_stream_name.to_string(),
        records: records.clone(),
    };

    tracing::trace!(state = ?BatchState::AwaitingResult);

    let outcome = delivery_stream.put_record_batch(request).await;

    let (state, outcomes) = reconcile_with_state(records, outcome);

    tracing::debug!(state = ?state, "Reconciled batch.");

    outcomes
}

/// Pairs the records of a batch with the outcome of its `PutRecordBatch` call.
///
/// This is a pure function of its inputs:
/// - a response is paired index by index with the records; an entry with an error code
///   yields a [`PutRecordError`] carrying that code and message, any other entry yields a
///   [`PutRecordResult`] carrying the assigned record ID.
/// - a failed call yields an `InternalFailure` error for every record, with the message
///   `PutRecordBatch call failed: <cause>`.
/// - a response whose length does not match the batch is treated as a failed call.
pub fn reconcile(
    records: Vec<Record>,
    outcome: FirehoseResult<PutRecordBatchResponse>,
) -> Vec<RecordOutcome> {
    reconcile_with_state(records, outcome).1
}

fn reconcile_with_state(
    records: Vec<Record>,
    outcome: FirehoseResult<PutRecordBatchResponse>,
) -> (BatchState, Vec<RecordOutcome>) {
    let response = match outcome {
        Ok(response) if response.request_responses.len() == records.len() => response,
        Ok(response) => {
            let err = FirehoseError::MismatchedResponseLength {
                expected: records.len(),
                actual: response.request_responses.len(),
            };

            tracing::warn!("Malformed PutRecordBatch response: {}", err);

            return (
                BatchState::WholeFailureReconciled,
                fail_batch(records, &err),
            );
        }
        Err(err) => {
            tracing::warn!("PutRecordBatch call failed: {:#?}", err);

            return (
                BatchState::WholeFailureReconciled,
                fail_batch(records, &err),
            );
        }
    };

    let outcomes = records
        .into_iter()
        .zip(response.request_responses)
        .map(|(record, entry)| reconcile_entry(record, entry))
        .collect();

    (BatchState::PartialReconciled, outcomes)
}

fn reconcile_entry(record: Record, entry: PutRecordBatchResponseEntry) -> RecordOutcome {
    if entry.is_failure() {
        return Err(PutRecordError {
            record,
            error_code: entry.error_code.unwrap_or_default(),
            error_message: entry.error_message.unwrap_or_default(),
        });
    }

    Ok(PutRecordResult {
        record,
        record_id: entry.record_id.unwrap_or_default(),
    })
}

fn fail_batch(records: Vec<Record>, cause: &FirehoseError) -> Vec<RecordOutcome> {
    records
        .into_iter()
        .map(|record| Err(PutRecordError::batch_call_failed(record, cause)))
        .collect()
}
