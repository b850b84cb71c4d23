//! Change-stream input.
//!
//! Batches arrive as a JSON envelope holding a `Records` array. The envelope
//! must parse; each record then decodes on its own so that one bad record
//! never takes its siblings down with it.

mod batch;

pub use batch::{decode_record, StreamBatch};
