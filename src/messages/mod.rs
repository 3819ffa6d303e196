//! General data structures passed into and out of the pipeline.

mod put_record_batch_request;
mod put_record_batch_response;
mod record;
mod record_outcome;

pub use put_record_batch_request::*;
pub use put_record_batch_response::*;
pub use record::*;
pub use record_outcome::*;
