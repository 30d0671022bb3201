//! Rolling per-room reading history.
//!
//! A [`HistoryBuffer`] keeps the most recent readings of one room, oldest
//! first. It holds at most [`HISTORY_CAPACITY`] entries: a week of hourly
//! points plus the current reading. Appending to a full buffer evicts exactly
//! one entry, the oldest.
//!
//! Readings are only ever appended at "now", so insertion order is
//! chronological order.

use std::collections::VecDeque;

use time::OffsetDateTime;

use roomwatch_types::{Quantity, Reading};

/// Number of hourly history points kept before the current reading.
pub const HISTORY_POINTS: usize = 168;

/// Maximum number of readings kept per room.
pub const HISTORY_CAPACITY: usize = HISTORY_POINTS + 1;

/// Fixed-capacity FIFO of readings for one room.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    /// Create an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Create an empty buffer holding at most `capacity` readings.
    ///
    /// A capacity of zero is raised to one so the current reading is always
    /// retained.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a buffer pre-filled with seed readings.
    ///
    /// If more seed readings are supplied than fit, only the newest are kept.
    pub fn seeded(seed: impl IntoIterator<Item = Reading>) -> Self {
        let mut buffer = Self::new();
        buffer.extend(seed);
        buffer
    }

    /// Append a reading, evicting the oldest entry once at capacity.
    ///
    /// Returns the evicted reading, if any.
    pub fn push(&mut self, reading: Reading) -> Option<Reading> {
        self.readings.push_back(reading);
        if self.readings.len() > self.capacity {
            self.readings.pop_front()
        } else {
            None
        }
    }

    /// Number of readings currently held.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the buffer holds no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Maximum number of readings held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest reading still held.
    pub fn oldest(&self) -> Option<&Reading> {
        self.readings.front()
    }

    /// Most recent reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// Iterate readings oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Reading> + ExactSizeIterator {
        self.readings.iter()
    }

    /// Project one quantity as a `(timestamp, value)` series, oldest first.
    pub fn series(&self, quantity: Quantity) -> Vec<(OffsetDateTime, f64)> {
        self.readings
            .iter()
            .map(|r| (r.timestamp, r.value(quantity)))
            .collect()
    }
}

impl Extend<Reading> for HistoryBuffer {
    fn extend<T: IntoIterator<Item = Reading>>(&mut self, iter: T) {
        for reading in iter {
            self.push(reading);
        }
    }
}
