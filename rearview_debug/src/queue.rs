// Copyright 2026 the Rearview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded event log.

use std::collections::VecDeque;

/// Bounded FIFO with a drop-oldest overflow policy.
#[derive(Debug, Clone)]
pub(crate) struct BoundedLog<T> {
    items: VecDeque<T>,
    capacity: usize,
    dropped: u64,
}

impl<T: Clone> BoundedLog<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub(crate) fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
            self.dropped += 1;
        }
        self.items.push_back(item);
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    pub(crate) fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::BoundedLog;

    #[test]
    fn zero_capacity_keeps_the_newest() {
        let mut log = BoundedLog::with_capacity(0);
        log.push(1_u8);
        log.push(2_u8);
        assert_eq!(log.snapshot(), [2]);
        assert_eq!(log.dropped(), 1);
    }

    #[test]
    fn overflow_drops_oldest_and_drain_empties() {
        let mut log = BoundedLog::with_capacity(2);
        for i in 1..=4_u8 {
            log.push(i);
        }
        assert_eq!(log.drain(), [3, 4]);
        assert!(log.snapshot().is_empty());
        assert_eq!(log.dropped(), 2);
    }
}
