//! # movequest-core
//!
//! **Step and acceleration telemetry from a MoveQuest wearable.**
//!
//! The wearable pushes one [`TelemetrySample`] at a time over HTTP. Samples land
//! in a [`TelemetryBuffer`], a fixed-capacity store of the most recent readings
//! that any number of consumers can copy out of with [`TelemetryBuffer::snapshot`].
//!
//! ## Quick Start
//!
//! ```
//! use movequest_core::{TelemetryBuffer, TelemetrySample};
//!
//! let buffer = TelemetryBuffer::new(3);
//! for i in 0..4 {
//!     buffer.append(TelemetrySample::new(i as f64, i, 1.0, 1.0));
//! }
//!
//! let snap = buffer.snapshot();
//! assert_eq!(snap.steps, vec![1, 2, 3]);
//! ```
//!
//! ## Architecture
//!
//! device → ingest → buffer ← snapshot ← {live view, CSV logger}
//!
//! Consumers poll on their own timers. Nothing blocks the producer, so a
//! consumer can see the same contents twice or miss a sample that was evicted
//! between two polls.

pub mod buffer;
pub mod csv_log;
pub mod ingest;
pub mod record;
pub mod sample;
pub mod view;

pub use buffer::{BufferStats, DEFAULT_CAPACITY, Snapshot, TelemetryBuffer};
pub use csv_log::{AccelLogWriter, LogContents, read_log};
pub use ingest::{IngestError, IngestPayload};
pub use record::{ACCEL_FIELDS, AccelRecord, RecordError};
pub use sample::{TelemetrySample, unix_now_secs};
pub use view::{AxisSeries, STEP_THRESHOLD_G, TimeSeriesView};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
