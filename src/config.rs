//! Batching options.
use std::time::Duration;

use crate::error::{FirehoseError, FirehoseResult};

/// Default time an open batch waits before it is flushed.
pub const DEFAULT_BATCH_TIME: Duration = Duration::from_millis(500);
/// Default maximum number of records in a batch.
pub const DEFAULT_BATCH_NUMBER: usize = 200;
/// Default number of batch calls allowed in flight at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 1;

const BATCH_TIME_ENV: &str = "FIREHOSE_BATCH_TIME_MS";
const BATCH_NUMBER_ENV: &str = "FIREHOSE_BATCH_NUMBER";
const MAX_IN_FLIGHT_ENV: &str = "FIREHOSE_MAX_IN_FLIGHT";

/// Options controlling how records are grouped and submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// The longest an open batch waits, counted from its first record, before it is flushed.
    pub batch_time: Duration,
    /// The maximum number of records in a batch. A full batch is flushed immediately.
    pub batch_number: usize,
    /// How many batch calls may be in flight at once.
    ///
    /// Entries are always emitted batch by batch in submission order, whatever this is set to.
    pub max_in_flight: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_time: DEFAULT_BATCH_TIME,
            batch_number: DEFAULT_BATCH_NUMBER,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl BatchOptions {
    /// Sets the batch time.
    pub fn with_batch_time(mut self, batch_time: Duration) -> Self {
        self.batch_time = batch_time;
        self
    }

    /// Sets the maximum batch size.
    pub fn with_batch_number(mut self, batch_number: usize) -> Self {
        self.batch_number = batch_number;
        self
    }

    /// Sets the number of concurrent batch calls.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Checks that these options can form and submit batches.
    pub fn validate(&self) -> FirehoseResult<()> {
        if self.batch_number == 0 {
            return Err(FirehoseError::InvalidOptions(
                "batch_number must be at least 1".to_string(),
            ));
        }

        if self.max_in_flight == 0 {
            return Err(FirehoseError::InvalidOptions(
                "max_in_flight must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Reads options from `FIREHOSE_BATCH_TIME_MS`, `FIREHOSE_BATCH_NUMBER` and
    /// `FIREHOSE_MAX_IN_FLIGHT`, keeping the default for any that are unset.
    pub fn from_env() -> FirehoseResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FirehoseResult<Self> {
        let mut options = Self::default();

        if let Some(batch_time) = lookup(BATCH_TIME_ENV) {
            options.batch_time = Duration::from_millis(batch_time.trim().parse()?);
        }

        if let Some(batch_number) = lookup(BATCH_NUMBER_ENV) {
            options.batch_number = batch_number.trim().parse()?;
        }

        if let Some(max_in_flight) = lookup(MAX_IN_FLIGHT_ENV) {
            options.max_in_flight = max_in_flight.trim().parse()?;
        }

        options.validate()?;

        Ok(options)
    }
}
