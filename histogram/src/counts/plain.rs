// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::counts::{Counts, EMPTY_MAX, EMPTY_MIN};
use crate::Error;
use std::cell::Cell;

macro_rules! plain_counts {
    ($name:ident, $width:ty) => {
        /// Non-atomic counts storage. Not safe for concurrent mutation --
        /// callers recording into, or querying, the same histogram from more
        /// than one thread must provide their own external ordering (a
        /// mutex, or routing through the synchronized/phaser-backed
        /// policies instead).
        pub struct $name {
            counts: Box<[Cell<$width>]>,
            total_count: Cell<u64>,
            min_value: Cell<i64>,
            max_value: Cell<i64>,
        }

        impl $name {
            fn saturating_of(value: i64) -> $width {
                value.clamp(<$width>::MIN as i64, <$width>::MAX as i64) as $width
            }
        }

        impl Counts for $name {
            fn with_len(len: usize) -> Self {
                let mut counts = Vec::with_capacity(len);
                counts.resize_with(len, || Cell::new(0));
                Self {
                    counts: counts.into_boxed_slice(),
                    total_count: Cell::new(0),
                    min_value: Cell::new(EMPTY_MIN),
                    max_value: Cell::new(EMPTY_MAX),
                }
            }

            fn len(&self) -> usize {
                self.counts.len()
            }

            fn count_at(&self, index: usize) -> i64 {
                self.counts[index].get() as i64
            }

            fn add_count_at(&self, index: usize, delta: i64) -> Result<(), Error> {
                let current = self.counts[index].get() as i64;
                let updated = current + delta;
                let mut overflowed = false;
                if updated > <$width>::MAX as i64 || updated < <$width>::MIN as i64 {
                    overflowed = true;
                }
                self.counts[index].set(Self::saturating_of(updated));

                let total = self.total_count.get().saturating_add(delta as u64);
                if delta > 0 && total > u64::MAX - delta as u64 {
                    overflowed = true;
                }
                self.total_count.set(total);

                if overflowed {
                    return Err(Error::OverflowedSmallWidth);
                }
                Ok(())
            }

            fn sub_count_at(&self, index: usize, delta: i64) -> Result<(), Error> {
                let current = self.counts[index].get() as i64;
                if current < delta {
                    return Err(Error::NegativeCountAfterSubtract);
                }
                self.counts[index].set(Self::saturating_of(current - delta));
                self.total_count
                    .set(self.total_count.get().saturating_sub(delta as u64));
                Ok(())
            }

            fn set_count_at(&self, index: usize, value: i64) {
                let previous = self.counts[index].get() as i64;
                self.counts[index].set(Self::saturating_of(value));
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
                for cell in self.counts.iter() {
                    cell.set(0);
                }
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
    };
}

plain_counts!(PlainCounts64, i64);
plain_counts!(PlainCounts32, i32);
plain_counts!(PlainCounts16, i16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_read_back() {
        let counts = PlainCounts64::with_len(4);
        counts.add_count_at(1, 1).unwrap();
        assert_eq!(counts.count_at(1), 1);
        assert_eq!(counts.total_count(), 1);
    }

    #[test]
    fn narrow_width_overflows_but_stays_usable() {
        let counts = PlainCounts16::with_len(1);
        counts.add_count_at(0, i16::MAX as i64).unwrap();
        assert_eq!(counts.add_count_at(0, 1), Err(Error::OverflowedSmallWidth));
        assert_eq!(counts.count_at(0), i16::MAX as i64);
    }

    #[test]
    fn subtract_below_zero_is_rejected() {
        let counts = PlainCounts64::with_len(1);
        counts.add_count_at(0, 1).unwrap();
        assert_eq!(
            counts.sub_count_at(0, 2),
            Err(Error::NegativeCountAfterSubtract)
        );
        assert_eq!(counts.count_at(0), 1);
    }
}
