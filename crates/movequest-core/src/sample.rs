//! A single telemetry reading.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One reading of step count plus raw and filtered acceleration magnitude.
///
/// `timestamp` is seconds. It is whatever the device sent, or the server's
/// arrival time when the device sent none, and is not required to increase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: f64,
    pub step_count: u64,
    pub raw_magnitude: f64,
    pub filtered_magnitude: f64,
}

impl TelemetrySample {
    pub fn new(timestamp: f64, step_count: u64, raw_magnitude: f64, filtered_magnitude: f64) -> Self {
        Self {
            timestamp,
            step_count,
            raw_magnitude,
            filtered_magnitude,
        }
    }
}

/// Current wall-clock time as fractional seconds since the Unix epoch.
pub fn unix_now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
