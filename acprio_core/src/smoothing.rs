//! Fixed-length moving average over the most recent PV samples.

use std::collections::VecDeque;

/// FIFO of the last `capacity` samples. Always full: construction seeds every
/// slot, and each push evicts the oldest value.
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    buf: VecDeque<f64>,
    capacity: usize,
}

impl SmoothingWindow {
    /// A window of `capacity` slots (at least 1), all holding `value`.
    pub fn seeded(value: f64, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: std::iter::repeat_n(value, capacity).collect(),
            capacity,
        }
    }

    /// Append `value`, evict the oldest sample, and return the new average.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
        self.average()
    }

    pub fn average(&self) -> f64 {
        // Summed fresh each time; the window is short and this avoids drift.
        self.buf.iter().sum::<f64>() / self.buf.len() as f64
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.buf.iter().copied()
    }

    pub fn newest(&self) -> Option<f64> {
        self.buf.back().copied()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
