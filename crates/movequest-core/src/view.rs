//! Chart-ready series derived from a [`Snapshot`].
//!
//! The view is a pure function of one snapshot: the time axis is each
//! timestamp minus the first timestamp in that snapshot. Timestamps are not
//! assumed monotonic, so axis bounds come from the actual min/max.

use crate::buffer::Snapshot;
use crate::sample::TelemetrySample;

/// Filtered magnitude (g) above which the wearable counts a step.
pub const STEP_THRESHOLD_G: f64 = 1.2;

/// Plot points and axis bounds for the step and acceleration charts.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesView {
    /// Seconds since the first sample in the snapshot, one per sample.
    pub time_axis: Vec<f64>,
    pub steps: Vec<(f64, f64)>,
    pub raw: Vec<(f64, f64)>,
    pub filtered: Vec<(f64, f64)>,
    pub time_bounds: [f64; 2],
    pub step_bounds: [f64; 2],
    pub accel_bounds: [f64; 2],
    pub latest: TelemetrySample,
    pub len: usize,
}

impl TimeSeriesView {
    /// Derive the view, or `None` for an empty snapshot.
    pub fn from_snapshot(snap: &Snapshot) -> Option<Self> {
        let latest = snap.last()?;
        let start = snap.timestamps[0];
        let time_axis: Vec<f64> = snap.timestamps.iter().map(|t| t - start).collect();

        let zip = |ys: &[f64]| -> Vec<(f64, f64)> {
            time_axis.iter().copied().zip(ys.iter().copied()).collect()
        };
        let step_vals: Vec<f64> = snap.steps.iter().map(|&s| s as f64).collect();
        let steps = zip(&step_vals);
        let raw = zip(&snap.raw_accel);
        let filtered = zip(&snap.filtered_accel);

        let (t_min, t_max) = min_max(time_axis.iter().copied());
        // A single sample (or identical timestamps) still needs a visible axis.
        let time_bounds = if t_max > t_min {
            [t_min, t_max]
        } else {
            [t_min, t_min + 1.0]
        };

        let (s_min, s_max) = min_max(step_vals.iter().copied());
        let step_bounds = [s_min.max(0.0), s_max + 1.0];

        let (a_min, a_max) = min_max(
            snap.raw_accel
                .iter()
                .chain(&snap.filtered_accel)
                .copied()
                .chain(std::iter::once(STEP_THRESHOLD_G)),
        );
        let accel_bounds = [a_min - 0.1, a_max + 0.1];

        Some(Self {
            len: time_axis.len(),
            time_axis,
            steps,
            raw,
            filtered,
            time_bounds,
            step_bounds,
            accel_bounds,
            latest,
        })
    }

    /// Per-axis traces on this view's time axis. `axes` must hold one
    /// `[x, y, z]` entry per sample; otherwise there is nothing to plot.
    pub fn axis_series(&self, axes: &[[f64; 3]]) -> Option<AxisSeries> {
        if axes.is_empty() || axes.len() != self.len {
            return None;
        }
        let trace = |i: usize| -> Vec<(f64, f64)> {
            self.time_axis
                .iter()
                .zip(axes)
                .map(|(&t, a)| (t, a[i]))
                .collect()
        };
        let (lo, hi) = min_max(axes.iter().flatten().copied());
        Some(AxisSeries {
            x: trace(0),
            y: trace(1),
            z: trace(2),
            bounds: [lo - 0.1, hi + 0.1],
        })
    }

    /// Two points spanning the time axis at [`STEP_THRESHOLD_G`].
    pub fn threshold_line(&self) -> [(f64, f64); 2] {
        [
            (self.time_bounds[0], STEP_THRESHOLD_G),
            (self.time_bounds[1], STEP_THRESHOLD_G),
        ]
    }
}

/// X, Y and Z acceleration against the shared time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSeries {
    pub x: Vec<(f64, f64)>,
    pub y: Vec<(f64, f64)>,
    pub z: Vec<(f64, f64)>,
    pub bounds: [f64; 2],
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}
