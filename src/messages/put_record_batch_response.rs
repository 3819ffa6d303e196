/// The per-item part of a `PutRecordBatch` response.
///
/// A successful entry carries a `record_id`, a failed one carries an `error_code`
/// and usually an `error_message`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRecordBatchResponseEntry {
    /// The ID assigned to the record by the delivery stream.
    pub record_id: Option<String>,
    /// The error code of a record that was not accepted.
    pub error_code: Option<String>,
    /// The error message of a record that was not accepted.
    pub error_message: Option<String>,
}

impl PutRecordBatchResponseEntry {
    /// An entry for an accepted record.
    pub fn success(record_id: impl Into<String>) -> Self {
        Self {
            record_id: Some(record_id.into()),
            ..Default::default()
        }
    }

    /// An entry for a rejected record.
    pub fn failure(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_code: Some(error_code.into()),
            error_message: Some(error_message.into()),
            ..Default::default()
        }
    }

    /// Whether the record was rejected. An empty error code does not count as a rejection.
    pub fn is_failure(&self) -> bool {
        self.error_code.as_deref().is_some_and(|code| !code.is_empty())
    }
}

/// The response of a `PutRecordBatch` call that completed.
///
/// The call may still have failed for some of its records; `request_responses` holds one
/// entry per submitted record, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRecordBatchResponse {
    /// How many records of the batch were rejected.
    pub failed_put_count: u32,
    /// Whether server side encryption was enabled for the call.
    pub encrypted: bool,
    /// The per-item results.
    pub request_responses: Vec<PutRecordBatchResponseEntry>,
}

impl From<Vec<PutRecordBatchResponseEntry>> for PutRecordBatchResponse {
    fn from(value: Vec<PutRecordBatchResponseEntry>) -> Self {
        let failed_put_count = value
            .iter()
            .filter(|entry| entry.is_failure())
            .count()
            .try_into()
            .unwrap_or(u32::MAX);

        Self {
            failed_put_count,
            encrypted: false,
            request_responses: value,
        }
    }
}
