use super::Record;

/// One `PutRecordBatch` call: a batch of records bound for a named delivery stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecordBatchRequest {
    /// The delivery stream the records are written to.
    pub delivery_stream_name: String,
    /// The records of the batch, in submission order.
    pub records: Vec<Record>,
}

impl PutRecordBatchRequest {
    /// Total payload size of the batch in bytes.
    pub fn size(&self) -> usize {
        self.records.iter().map(Record::len).sum()
    }
}
