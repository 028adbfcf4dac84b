// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::counts::{Counts, EMPTY_MAX, EMPTY_MIN};
use crate::Error;
use hdrhistogram_atomics::{Arithmetic, Atomic, AtomicI64, Ordering};

/// Lock-free counts storage: every slot and aggregate is a 64 bit atomic, so
/// concurrent recorders never block each other. Min/max updates race by
/// nature (two threads can both see a stale extreme); they are resolved with
/// a compare-exchange retry loop rather than a lock, per §4.2's "Atomic"
/// policy.
pub struct AtomicCounts {
    counts: Box<[AtomicI64]>,
    total_count: AtomicI64,
    min_value: AtomicI64,
    max_value: AtomicI64,
}

impl Counts for AtomicCounts {
    fn with_len(len: usize) -> Self {
        let mut counts = Vec::with_capacity(len);
        counts.resize_with(len, || AtomicI64::new(0));
        Self {
            counts: counts.into_boxed_slice(),
            total_count: AtomicI64::new(0),
            min_value: AtomicI64::new(EMPTY_MIN),
            max_value: AtomicI64::new(EMPTY_MAX),
        }
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn count_at(&self, index: usize) -> i64 {
        self.counts[index].load(Ordering::SeqCst)
    }

    fn add_count_at(&self, index: usize, delta: i64) -> Result<(), Error> {
        self.counts[index].fetch_add(delta, Ordering::SeqCst);
        self.total_count.fetch_add(delta, Ordering::SeqCst);
        Ok(())
    }

    fn sub_count_at(&self, index: usize, delta: i64) -> Result<(), Error> {
        loop {
            let current = self.counts[index].load(Ordering::SeqCst);
            if current < delta {
                return Err(Error::NegativeCountAfterSubtract);
            }
            if self
                .counts[index]
                .compare_exchange(current, current - delta, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                self.total_count.fetch_sub(delta, Ordering::SeqCst);
                return Ok(());
            }
        }
    }

    fn set_count_at(&self, index: usize, value: i64) {
        loop {
            let previous = self.counts[index].load(Ordering::SeqCst);
            if self
                .counts[index]
                .compare_exchange(previous, value, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                self.total_count
                    .fetch_add(value - previous, Ordering::SeqCst);
                return;
            }
        }
    }

    fn clear(&self) {
        for slot in self.counts.iter() {
            slot.store(0, Ordering::SeqCst);
        }
        self.total_count.store(0, Ordering::SeqCst);
        self.min_value.store(EMPTY_MIN, Ordering::SeqCst);
        self.max_value.store(EMPTY_MAX, Ordering::SeqCst);
    }

    fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::SeqCst) as u64
    }

    fn min_value(&self) -> i64 {
        self.min_value.load(Ordering::SeqCst)
    }

    fn max_value(&self) -> i64 {
        self.max_value.load(Ordering::SeqCst)
    }

    fn track_value(&self, value: i64) {
        loop {
            let current = self.min_value.load(Ordering::SeqCst);
            if value >= current
                || self
                    .min_value
                    .compare_exchange(current, value, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                break;
            }
        }
        loop {
            let current = self.max_value.load(Ordering::SeqCst);
            if value <= current
                || self
                    .max_value
                    .compare_exchange(current, value, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
            {
                break;
            }
        }
    }

    fn set_total_count(&self, value: u64) {
        self.total_count.store(value as i64, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_read_back() {
        let counts = AtomicCounts::with_len(4);
        counts.add_count_at(2, 5).unwrap();
        assert_eq!(counts.count_at(2), 5);
        assert_eq!(counts.total_count(), 5);
    }

    #[test]
    fn min_max_track_across_values() {
        let counts = AtomicCounts::with_len(1);
        counts.track_value(10);
        counts.track_value(3);
        counts.track_value(7);
        assert_eq!(counts.min_value(), 3);
        assert_eq!(counts.max_value(), 10);
    }

    #[test]
    fn subtract_below_zero_is_rejected() {
        let counts = AtomicCounts::with_len(1);
        counts.add_count_at(0, 1).unwrap();
        assert_eq!(
            counts.sub_count_at(0, 2),
            Err(Error::NegativeCountAfterSubtract)
        );
        assert_eq!(counts.count_at(0), 1);
    }
}
