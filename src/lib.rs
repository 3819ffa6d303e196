//! Firehose Stream
//!
//! A streaming adapter that writes an unbounded stream of records to a batch oriented,
//! partially failable `PutRecordBatch` API and hands back one outcome per record.
//!
//! Records are grouped into batches by time or count, each batch is written with a single
//! call, and the call's outcome is unzipped back onto the records of the batch. Failures,
//! whether of a single record or of a whole call, come out of the stream as
//! [`messages::PutRecordError`] values and never end it.
//!
//! example usage:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use firehose_stream::{BatchOptions, delivery_stream::memory::InMemoryDeliveryStream, to_firehose};
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let delivery_stream = Arc::new(InMemoryDeliveryStream::new());
//! delivery_stream.create_delivery_stream("example-stream");
//!
//! let records = futures::stream::iter(vec!["a", "b", "c"]);
//!
//! let outcomes = to_firehose(
//!     records,
//!     delivery_stream.clone(),
//!     "example-stream",
//!     BatchOptions::default(),
//! )?
//! .collect::<Vec<_>>()
//! .await;
//!
//! assert_eq!(outcomes.len(), 3);
//! assert!(outcomes.iter().all(|outcome| outcome.is_ok()));
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::unwrap_used)]

pub mod batcher;
mod config;
pub mod delivery_stream;
pub mod error;
pub mod messages;
pub mod submitter;

use std::sync::Arc;

use futures::{Stream, StreamExt};

pub use config::*;
use delivery_stream::DeliveryStream;
use error::FirehoseResult;
use messages::{Record, RecordOutcome};

/// Writes every record of `input` to the named delivery stream, batching by time or count.
///
/// The returned stream yields exactly one [`RecordOutcome`] per input record. Outcomes of a
/// batch keep the order of the batch, and batches are reported in the order they were
/// formed. It ends once `input` ends and every batch has been reconciled. Dropping it
/// abandons any call still in flight.
///
/// # Errors
/// Returns an error if `options` are invalid. Nothing that happens once the stream runs is
/// returned as an error.
#[tracing::instrument(skip_all, name = "to_firehose")]
pub fn to_firehose<S>(
    input: S,
    delivery_stream: Arc<dyn DeliveryStream>,
    delivery_stream_name: impl Into<Arc<str>>,
    options: BatchOptions,
) -> FirehoseResult<impl Stream<Item = RecordOutcome>>
where
    S: Stream,
    S::Item: Into<Record>,
{
    options.validate()?;

    tracing::debug!("Writing with {:#?}.", options);

    let batches = batcher::batch_with_time_or_count(input.map(Into::<Record>::into), &options);

    Ok(submitter::submit_batches(
        batches,
        delivery_stream,
        delivery_stream_name,
        options.max_in_flight,
    ))
}
