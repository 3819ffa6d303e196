use std::{process::ExitCode, sync::Arc};

use firehose_stream::{
    BatchOptions, delivery_stream::memory::InMemoryDeliveryStream, messages::Record, to_firehose,
};
use futures::{StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};

const DELIVERY_STREAM_NAME: &str = "stdin";

/// Writes each line of stdin as a record to an in-memory delivery stream and reports
/// every outcome.
#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let options = BatchOptions::from_env()?;

    let delivery_stream = Arc::new(InMemoryDeliveryStream::new());
    delivery_stream.create_delivery_stream(DELIVERY_STREAM_NAME);

    let lines = BufReader::new(tokio::io::stdin()).lines();

    let records = stream::unfold(lines, |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((Record::from(line), lines)),
            Ok(None) => None,
            Err(err) => {
                tracing::error!("Failed to read from stdin: {:#?}", err);
                None
            }
        }
    });

    let mut outcomes = Box::pin(to_firehose(
        records,
        delivery_stream.clone(),
        DELIVERY_STREAM_NAME,
        options,
    )?);

    let (mut delivered, mut failed) = (0usize, 0usize);

    while let Some(outcome) = outcomes.next().await {
        match outcome {
            Ok(result) => {
                delivered += 1;
                tracing::info!(record_id = %result.record_id, "Delivered {} bytes.", result.record.len());
            }
            Err(err) => {
                failed += 1;
                tracing::error!(error_code = %err.error_code, "Failed to deliver record: {}", err.error_message);
            }
        }
    }

    tracing::info!("Delivered {} records, {} failed.", delivered, failed);

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
