//! Errors raised by delivery streams and by pipeline construction.
use std::num::ParseIntError;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type FirehoseResult<T> = Result<T, FirehoseError>;

/// Whole-call and construction errors.
///
/// None of these ever terminate a running pipeline: a failed `PutRecordBatch` call is
/// turned into one `InternalFailure` entry per record of the batch.
#[derive(Error, Debug)]
pub enum FirehoseError {
    /// Generic Error for arbitrary errors that are generally not classified but should still convey information.
    #[error("{0}")]
    Generic(String),
    /// Unknown error.
    #[error("unknown delivery stream error")]
    Unknown,

    /// The service could not take the call, e.g. because it is throttling or paused.
    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
    /// The named delivery stream does not exist.
    #[error("Delivery stream {0} not found")]
    ResourceNotFound(String),
    /// The call was rejected as a whole, e.g. because it exceeded a service limit.
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
    /// The call returned a different number of entries than records were sent.
    #[error("Response carried {actual} entries for a batch of {expected} records")]
    MismatchedResponseLength {
        /// Number of records in the submitted batch.
        expected: usize,
        /// Number of entries in the response.
        actual: usize,
    },

    /// Batch options that can never produce a batch.
    #[error("Invalid Batch Options: {0}")]
    InvalidOptions(String),

    // Inferred
    /// Integer parsing error, raised while reading options from the environment.
    #[error("Integer Parse Error: {0}")]
    ParseIntError(#[from] ParseIntError),
}
