//! Ingest schema: what a device may POST and how it becomes a sample.
//!
//! Every field is optional. Missing or `null` fields take these defaults:
//!
//! | field                | default                  |
//! |----------------------|--------------------------|
//! | `timestamp`          | server arrival time (s)  |
//! | `steps`              | 0                        |
//! | `raw_magnitude`      | 0.0                      |
//! | `filtered_magnitude` | 0.0                      |
//!
//! Unknown fields are ignored. A body that is not a JSON object, or a field
//! of the wrong type (e.g. `"steps": -1` or `"steps": "ten"`), is rejected.

use serde::Deserialize;

use crate::sample::TelemetrySample;

/// Reasons an ingest body is refused.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload must be a JSON object")]
    NotAnObject,
}

/// Validated ingest body. Convert with [`IngestPayload::into_sample`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IngestPayload {
    pub timestamp: Option<f64>,
    pub steps: Option<u64>,
    pub raw_magnitude: Option<f64>,
    pub filtered_magnitude: Option<f64>,
}

impl IngestPayload {
    /// Parse a raw request body.
    pub fn parse(body: &[u8]) -> Result<Self, IngestError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        // serde would happily read a struct out of a positional array.
        if !value.is_object() {
            return Err(IngestError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Fill defaults and build the sample. `arrival_secs` is used when the
    /// device sent no timestamp.
    pub fn into_sample(self, arrival_secs: f64) -> TelemetrySample {
        TelemetrySample {
            timestamp: self.timestamp.unwrap_or(arrival_secs),
            step_count: self.steps.unwrap_or(0),
            raw_magnitude: self.raw_magnitude.unwrap_or(0.0),
            filtered_magnitude: self.filtered_magnitude.unwrap_or(0.0),
        }
    }
}
