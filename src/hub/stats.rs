//! Windowed call statistics

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Call counts keyed by full method name and by consumer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatSnapshot {
    pub by_method: HashMap<String, u64>,
    pub by_consumer: HashMap<String, u64>,
}

impl StatSnapshot {
    /// A single call of `method` by `consumer`
    pub fn increment(consumer: &str, method: &str) -> Self {
        Self {
            by_method: HashMap::from([(method.to_string(), 1)]),
            by_consumer: HashMap::from([(consumer.to_string(), 1)]),
        }
    }

    /// Add every counter of `other` into `self`, creating missing keys
    pub fn merge(&mut self, other: &StatSnapshot) {
        for (method, count) in &other.by_method {
            *self.by_method.entry(method.clone()).or_insert(0) += count;
        }
        for (consumer, count) in &other.by_consumer {
            *self.by_consumer.entry(consumer.clone()).or_insert(0) += count;
        }
    }

    pub fn method_count(&self, method: &str) -> u64 {
        self.by_method.get(method).copied().unwrap_or(0)
    }

    pub fn consumer_count(&self, consumer: &str) -> u64 {
        self.by_consumer.get(consumer).copied().unwrap_or(0)
    }

    /// Total calls counted in this snapshot
    pub fn total_calls(&self) -> u64 {
        self.by_method.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty() && self.by_consumer.is_empty()
    }
}

/// Lock-protected accumulator for one statistics window
///
/// [`take`](Self::take) returns the accumulated counters and resets the
/// window in a single critical section, so no increment is lost or counted
/// twice across a flush.
#[derive(Debug, Default)]
pub struct StatAggregator {
    window: Mutex<StatSnapshot>,
}

impl StatAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an increment into the current window
    pub fn merge(&self, increment: &StatSnapshot) {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(increment);
    }

    /// Read the current window and reset it to zero
    pub fn take(&self) -> StatSnapshot {
        std::mem::take(&mut *self.window.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of the current window without resetting it
    pub fn peek(&self) -> StatSnapshot {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
