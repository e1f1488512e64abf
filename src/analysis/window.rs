//! Fixed-capacity sample window.

use std::collections::VecDeque;

/// FIFO buffer of the most recent samples, in milliseconds.
///
/// Pushing into a full window evicts the oldest sample first.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<i64>,
    capacity: usize,
}

impl SampleWindow {
    /// Create a window holding at most `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: i64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.samples.iter().copied()
    }

    pub fn max(&self) -> Option<i64> {
        self.samples.iter().copied().max()
    }

    pub fn min(&self) -> Option<i64> {
        self.samples.iter().copied().min()
    }

    /// `(index, value)` pairs for charting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v as f64))
            .collect()
    }
}
