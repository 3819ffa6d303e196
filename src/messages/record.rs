use bytes::Bytes;

/// A single unit of application data written to a delivery stream.
///
/// The payload is opaque to the pipeline and is never modified after the record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    /// The record payload, sent as the `Data` field.
    pub data: Bytes,
}

impl Record {
    /// Creates a new record from anything convertible into bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Bytes> for Record {
    fn from(value: Bytes) -> Self {
        Self { data: value }
    }
}

impl From<Vec<u8>> for Record {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<String> for Record {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&'static str> for Record {
    fn from(value: &'static str) -> Self {
        Self::new(Bytes::from_static(value.as_bytes()))
    }
}
