use thiserror::Error;

use super::Record;

/// The error code given to every record of a batch whose call failed as a whole.
pub const INTERNAL_FAILURE: &str = "InternalFailure";

/// Prefix of the message given to every record of a batch whose call failed as a whole.
pub const BATCH_CALL_FAILED: &str = "PutRecordBatch call failed: ";

/// The outcome for a single record: accepted or not.
pub type RecordOutcome = Result<PutRecordResult, PutRecordError>;

/// A record accepted by the delivery stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordResult {
    /// The record that was written.
    pub record: Record,
    /// The ID assigned to the record by the delivery stream.
    pub record_id: String,
}

/// A record that was not accepted, either on its own or because its whole batch failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error_code}: {error_message}")]
pub struct PutRecordError {
    /// The record that was not written.
    pub record: Record,
    /// The error code, e.g. `ServiceUnavailableException` or `InternalFailure`.
    pub error_code: String,
    /// The human readable error message.
    pub error_message: String,
}

impl PutRecordError {
    /// Synthesizes the error for a record whose batch call failed outright.
    pub fn batch_call_failed(record: Record, cause: &impl std::fmt::Display) -> Self {
        Self {
            record,
            error_code: INTERNAL_FAILURE.to_string(),
            error_message: format!("{BATCH_CALL_FAILED}{cause}"),
        }
    }

    /// Whether this error was synthesized from a failed batch call.
    pub fn is_batch_call_failure(&self) -> bool {
        self.error_code == INTERNAL_FAILURE && self.error_message.starts_with(BATCH_CALL_FAILED)
    }
}
