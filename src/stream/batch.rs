//! Decoding of change-stream batches.

use crate::error::Result;
use crate::types::{EventKind, Image, StreamRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Records", default)]
    records: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct WireRecord {
    #[serde(rename = "eventID", default)]
    event_id: Option<String>,
    #[serde(rename = "eventName")]
    event_name: EventKind,
    dynamodb: WireChange,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireChange {
    #[serde(default)]
    new_image: Option<Image>,
    #[serde(default)]
    old_image: Option<Image>,
}

/// Decode a single stream record from its wire JSON.
pub fn decode_record(value: serde_json::Value) -> Result<StreamRecord> {
    let wire: WireRecord = serde_json::from_value(value)?;
    Ok(StreamRecord {
        event_id: wire.event_id,
        event_kind: wire.event_name,
        new_image: wire.dynamodb.new_image,
        old_image: wire.dynamodb.old_image,
    })
}

/// A decoded batch of stream records.
#[derive(Clone, Debug, Default)]
pub struct StreamBatch {
    /// Records that decoded, in delivery order.
    pub records: Vec<StreamRecord>,

    /// Records that could not be decoded and were dropped.
    pub rejected: usize,
}

impl StreamBatch {
    pub fn from_records(records: Vec<StreamRecord>) -> Self {
        Self {
            records,
            rejected: 0,
        }
    }

    /// Decode a batch from its JSON envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(json)?;
        Ok(Self::from_envelope(envelope))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let envelope: Envelope = serde_json::from_reader(reader)?;
        Ok(Self::from_envelope(envelope))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_envelope(envelope: Envelope) -> Self {
        let mut batch = StreamBatch::default();
        for (position, value) in envelope.records.into_iter().enumerate() {
            match decode_record(value) {
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    tracing::warn!(position, error = %e, "dropping undecodable stream record");
                    batch.rejected += 1;
                }
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
