//! Fixed-capacity, thread-safe store of the most recent telemetry samples.
//!
//! Architecture:
//! 1. One `RwLock` guards the whole store
//! 2. `append` takes the write side: evict oldest (FIFO) if full, then push
//! 3. `snapshot` takes the read side and copies everything out
//! 4. Snapshots never alias live storage, so consumers iterate at leisure
//!
//! Samples are kept whole inside the lock and only split into the four
//! parallel sequences when a [`Snapshot`] is built, so the sequences cannot
//! disagree in length.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::sample::TelemetrySample;

/// Number of samples retained when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 200;

struct Inner {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
    total_appended: u64,
    evicted: u64,
}

/// Bounded FIFO of telemetry samples shared between the ingest path and any
/// number of polling consumers.
pub struct TelemetryBuffer {
    inner: RwLock<Inner>,
}

impl TelemetryBuffer {
    /// Create a buffer holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: RwLock::new(Inner {
                samples: VecDeque::with_capacity(capacity),
                capacity,
                total_appended: 0,
                evicted: 0,
            }),
        }
    }

    /// Add `sample` as the newest element, evicting the oldest when full.
    pub fn append(&self, sample: TelemetrySample) {
        // Nothing inside the critical section can panic halfway through an
        // update, so a poisoned lock still guards consistent data.
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.samples.len() == inner.capacity {
            inner.samples.pop_front();
            inner.evicted += 1;
        }
        inner.samples.push_back(sample);
        inner.total_appended += 1;
    }

    /// Copy the current contents out as of a single instant.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Snapshot::from_samples(inner.samples.iter().copied())
    }

    /// Maximum number of retained samples.
    pub fn capacity(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).capacity
    }

    /// Number of samples currently retained.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .samples
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples appended since creation, including evicted ones.
    pub fn total_appended(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .total_appended
    }

    /// Samples dropped to make room for newer ones.
    pub fn evicted(&self) -> u64 {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).evicted
    }

    /// All counters read under one lock, so they agree with each other.
    pub fn stats(&self) -> BufferStats {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        BufferStats {
            len: inner.samples.len(),
            capacity: inner.capacity,
            total_appended: inner.total_appended,
            evicted: inner.evicted,
        }
    }
}

/// Point-in-time counters of a [`TelemetryBuffer`].
///
/// `total_appended == len + evicted` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    pub len: usize,
    pub capacity: usize,
    pub total_appended: u64,
    pub evicted: u64,
}

impl Default for TelemetryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable point-in-time copy of a buffer, oldest sample first.
///
/// Serializes to the `/api/data` wire shape: four same-length arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamps: Vec<f64>,
    pub steps: Vec<u64>,
    pub raw_accel: Vec<f64>,
    pub filtered_accel: Vec<f64>,
}

impl Snapshot {
    /// Build a snapshot from samples in arrival order.
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = TelemetrySample>,
    {
        let iter = samples.into_iter();
        let (lower, _) = iter.size_hint();
        let mut snap = Self {
            timestamps: Vec::with_capacity(lower),
            steps: Vec::with_capacity(lower),
            raw_accel: Vec::with_capacity(lower),
            filtered_accel: Vec::with_capacity(lower),
        };
        for s in iter {
            snap.timestamps.push(s.timestamp);
            snap.steps.push(s.step_count);
            snap.raw_accel.push(s.raw_magnitude);
            snap.filtered_accel.push(s.filtered_magnitude);
        }
        snap
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// True when all four sequences have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.timestamps.len();
        self.steps.len() == n && self.raw_accel.len() == n && self.filtered_accel.len() == n
    }

    /// Sample at position `idx` (0 = oldest).
    pub fn get(&self, idx: usize) -> Option<TelemetrySample> {
        Some(TelemetrySample {
            timestamp: *self.timestamps.get(idx)?,
            step_count: *self.steps.get(idx)?,
            raw_magnitude: *self.raw_accel.get(idx)?,
            filtered_magnitude: *self.filtered_accel.get(idx)?,
        })
    }

    /// Newest sample.
    pub fn last(&self) -> Option<TelemetrySample> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }
}
