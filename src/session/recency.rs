// ABOUTME: Bounded, duplicate-free recency list for recently used contract addresses.
// ABOUTME: Stored oldest-first so it serializes in insertion order; read newest-first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Insertion-ordered list with a caller-supplied capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecencyList {
    entries: VecDeque<String>,
}

impl RecencyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` unless it is already present, evicting the oldest
    /// entries so that at most `capacity` remain.
    ///
    /// Returns whether the value was inserted.
    pub fn record(&mut self, value: &str, capacity: usize) -> bool {
        if capacity == 0 || self.contains(value) {
            return false;
        }
        while self.entries.len() >= capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(value.to_string());
        true
    }

    /// Drop the oldest entries until at most `capacity` remain.
    pub fn truncate_oldest(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|e| e == value)
    }

    /// Most recent first.
    pub fn newest_first(&self) -> Vec<String> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
