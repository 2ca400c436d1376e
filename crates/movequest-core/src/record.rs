//! The 7-field comma-separated reading served by the wearable's `/data` route.
//!
//! ```text
//! timestamp_ms,accel_x_g,accel_y_g,accel_z_g,magnitude_g,filtered_magnitude_g,steps
//! 183422,0.02,-0.98,0.11,0.99,1.01,57
//! ```
//!
//! Polling checks shape only: one line, seven fields. Whitespace around the
//! line and around each field is trimmed, and the trimmed field text is what
//! gets persisted. [`AccelRecord::to_sample`] does the numeric parsing when a
//! log is replayed.

use crate::sample::TelemetrySample;

/// Column names, in wire order. Also the CSV log header.
pub const ACCEL_FIELDS: [&str; 7] = [
    "timestamp_ms",
    "accel_x_g",
    "accel_y_g",
    "accel_z_g",
    "magnitude_g",
    "filtered_magnitude_g",
    "steps",
];

const IDX_TIMESTAMP_MS: usize = 0;
const IDX_ACCEL_X: usize = 1;
const IDX_MAGNITUDE: usize = 4;
const IDX_FILTERED: usize = 5;
const IDX_STEPS: usize = 6;

/// Reasons a polled line or log row is refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("empty record")]
    Empty,

    #[error("record spans more than one line")]
    MultiLine,

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field {name} is not a number: {value:?}")]
    InvalidField { name: &'static str, value: String },
}

/// One reading with exactly [`ACCEL_FIELDS`]`.len()` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccelRecord {
    fields: [String; 7],
}

impl AccelRecord {
    /// Split a line on commas and check the field count.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(RecordError::Empty);
        }
        // A log row is exactly one physical line.
        if line.contains(['\n', '\r']) {
            return Err(RecordError::MultiLine);
        }
        let parts: Vec<String> = line.split(',').map(|p| p.trim().to_string()).collect();
        let found = parts.len();
        let fields: [String; 7] = parts.try_into().map_err(|_| RecordError::FieldCount {
            expected: ACCEL_FIELDS.len(),
            found,
        })?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String; 7] {
        &self.fields
    }

    /// The record as one CSV line, without a trailing newline.
    pub fn to_csv_line(&self) -> String {
        self.fields.join(",")
    }

    /// Numeric view of the record: timestamp in seconds, magnitude as the
    /// raw reading, filtered magnitude, and steps.
    pub fn to_sample(&self) -> Result<TelemetrySample, RecordError> {
        let timestamp_ms: f64 = self.number(IDX_TIMESTAMP_MS)?;
        let raw: f64 = self.number(IDX_MAGNITUDE)?;
        let filtered: f64 = self.number(IDX_FILTERED)?;
        let steps: u64 = self.number(IDX_STEPS)?;
        Ok(TelemetrySample::new(timestamp_ms / 1000.0, steps, raw, filtered))
    }

    /// Per-axis acceleration `[x, y, z]` in g.
    pub fn to_axes(&self) -> Result<[f64; 3], RecordError> {
        Ok([
            self.number(IDX_ACCEL_X)?,
            self.number(IDX_ACCEL_X + 1)?,
            self.number(IDX_ACCEL_X + 2)?,
        ])
    }

    fn number<T: std::str::FromStr>(&self, idx: usize) -> Result<T, RecordError> {
        let value = &self.fields[idx];
        value.parse().map_err(|_| RecordError::InvalidField {
            name: ACCEL_FIELDS[idx],
            value: value.clone(),
        })
    }
}
