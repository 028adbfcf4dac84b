// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::counts::{Counts, EMPTY_MAX, EMPTY_MIN};
use crate::Error;
use std::cell::{Cell, RefCell};

const INITIAL_PHYSICAL_LEN: usize = 64;

/// A sparse counts array (§4.9): most histograms only ever populate a
/// handful of slots near the observed values, so the physical backing
/// store starts small and only grows to cover the highest index actually
/// written. Unreserved slots read back as zero.
///
/// This trades the original packed representation's eight-interleaved-byte-set
/// encoding for a plain lazily-grown `i64` vector: simpler, and still
/// sparse in the sense that matters for this crate (memory proportional to
/// the highest index touched, not to `virtual_length`), at the cost of not
/// compacting runs of small values into single bytes.
pub struct PackedCounts {
    physical: RefCell<Vec<i64>>,
    virtual_len: usize,
    total_count: Cell<u64>,
    min_value: Cell<i64>,
    max_value: Cell<i64>,
}

impl PackedCounts {
    fn reserve(&self, index: usize) {
        let mut physical = self.physical.borrow_mut();
        if index >= physical.len() {
            let mut new_len = physical.len().max(1);
            while new_len <= index {
                new_len *= 2;
            }
            physical.resize(new_len.min(self.virtual_len), 0);
        }
    }
}

impl Counts for PackedCounts {
    fn with_len(len: usize) -> Self {
        Self {
            physical: RefCell::new(vec![0; INITIAL_PHYSICAL_LEN.min(len)]),
            virtual_len: len,
            total_count: Cell::new(0),
            min_value: Cell::new(EMPTY_MIN),
            max_value: Cell::new(EMPTY_MAX),
        }
    }

    fn len(&self) -> usize {
        self.virtual_len
    }

    fn count_at(&self, index: usize) -> i64 {
        self.physical
            .borrow()
            .get(index)
            .copied()
            .unwrap_or(0)
    }

    fn add_count_at(&self, index: usize, delta: i64) -> Result<(), Error> {
        self.reserve(index);
        let mut physical = self.physical.borrow_mut();
        physical[index] += delta;
        drop(physical);
        self.total_count.set(self.total_count.get().saturating_add(delta as u64));
        Ok(())
    }

    fn sub_count_at(&self, index: usize, delta: i64) -> Result<(), Error> {
        let current = self.count_at(index);
        if current < delta {
            return Err(Error::NegativeCountAfterSubtract);
        }
        self.reserve(index);
        self.physical.borrow_mut()[index] -= delta;
        self.total_count
            .set(self.total_count.get().saturating_sub(delta as u64));
        Ok(())
    }

    fn set_count_at(&self, index: usize, value: i64) {
        self.reserve(index);
        let previous = self.count_at(index);
        self.physical.borrow_mut()[index] = value;
        let delta = value - previous;
        if delta >= 0 {
            self.total_count
                .set(self.total_count.get().saturating_add(delta as u64));
        } else {
            self.total_count
                .set(self.total_count.get().saturating_sub((-delta) as u64));
        }
    }

    fn clear(&self) {
        self.physical.borrow_mut().iter_mut().for_each(|slot| *slot = 0);
        self.total_count.set(0);
        self.min_value.set(EMPTY_MIN);
        self.max_value.set(EMPTY_MAX);
    }

    fn total_count(&self) -> u64 {
        self.total_count.get()
    }

    fn min_value(&self) -> i64 {
        self.min_value.get()
    }

    fn max_value(&self) -> i64 {
        self.max_value.get()
    }

    fn track_value(&self, value: i64) {
        if value < self.min_value.get() {
            self.min_value.set(value);
        }
        if value > self.max_value.get() {
            self.max_value.set(value);
        }
    }

    fn set_total_count(&self, value: u64) {
        self.total_count.set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreserved_slots_read_as_zero() {
        let counts = PackedCounts::with_len(1_000_000);
        assert_eq!(counts.count_at(999_999), 0);
    }

    #[test]
    fn writes_past_initial_capacity_grow_lazily() {
        let counts = PackedCounts::with_len(1_000_000);
        counts.add_count_at(500_000, 7).unwrap();
        assert_eq!(counts.count_at(500_000), 7);
        assert_eq!(counts.total_count(), 7);
    }

    #[test]
    fn subtract_below_zero_is_rejected() {
        let counts = PackedCounts::with_len(8);
        counts.add_count_at(0, 1).unwrap();
        assert_eq!(
            counts.sub_count_at(0, 2),
            Err(Error::NegativeCountAfterSubtract)
        );
    }
}
