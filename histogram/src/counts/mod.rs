// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Counts storage policies (component B).
//!
//! Rather than a class hierarchy per concurrency policy (plain / atomic /
//! synchronized / packed), storage is expressed as one capability-set
//! trait, [`Counts`], per the REDESIGN FLAGS guidance. [`plain::PlainCounts`]
//! covers the non-atomic `i64`/`i32`/`i16` widths, [`atomic::AtomicCounts`]
//! covers the lock-free `i64` width, and [`packed::PackedCounts`] covers the
//! sparse byte-slice encoding (§4.9). All three use interior mutability (via
//! `&self`) so that [`crate::Histogram`] has a single, uniform API whether
//! or not the backing storage is safe to share across threads.

mod atomic;
mod packed;
mod plain;
mod synchronized;

pub use atomic::AtomicCounts;
pub use packed::PackedCounts;
pub use plain::{PlainCounts16, PlainCounts32, PlainCounts64};
pub use synchronized::Synchronized;

use crate::Error;

/// The sentinel `min_value` of an empty histogram.
pub const EMPTY_MIN: i64 = i64::MAX;
/// The sentinel `max_value` of an empty histogram.
pub const EMPTY_MAX: i64 = 0;

/// The capability set every counts-storage policy must provide. The
/// histogram core (component C) and the iterators (component D) are written
/// against this trait alone and are therefore oblivious to whether counts
/// live in a plain `Vec`, behind atomics, or in the packed sparse
/// representation.
pub trait Counts {
    /// Allocates storage for `len` logical counter slots, all zeroed, with
    /// aggregates reset to their empty sentinels.
    fn with_len(len: usize) -> Self;

    /// Number of logical counter slots.
    fn len(&self) -> usize;

    /// Reads the count at `index`.
    fn count_at(&self, index: usize) -> i64;

    /// Adds `delta` (`delta >= 0`) to the count at `index` and to the total
    /// count. Returns [`Error::OverflowedSmallWidth`] if a narrow-width
    /// counter or the total would overflow; per §4.2 the counter is still
    /// updated (the overflow is sticky until [`Counts::reestablish_total_count`]
    /// recovers it).
    fn add_count_at(&self, index: usize, delta: i64) -> Result<(), Error>;

    /// Subtracts `delta` from the count at `index` and from the total count.
    /// Returns [`Error::NegativeCountAfterSubtract`] without applying the
    /// change if the result would be negative.
    fn sub_count_at(&self, index: usize, delta: i64) -> Result<(), Error>;

    /// Unconditionally overwrites the count at `index` (used by the codec
    /// decoder, which reconstructs absolute counts rather than deltas) and
    /// folds the old-vs-new difference into the total count.
    fn set_count_at(&self, index: usize, value: i64);

    /// Zeroes every counter slot and resets the running aggregates.
    fn clear(&self);

    /// The running total of all recorded counts.
    fn total_count(&self) -> u64;

    /// The smallest value recorded, or [`EMPTY_MIN`] if nothing has been
    /// recorded.
    fn min_value(&self) -> i64;

    /// The largest value recorded, or [`EMPTY_MAX`] if nothing has been
    /// recorded.
    fn max_value(&self) -> i64;

    /// Folds `value` into the running min/max, independent of which counts
    /// slot it landed in.
    fn track_value(&self, value: i64);

    /// Recomputes `total_count` by summing every counter slot. Used to
    /// recover from a transient [`Error::OverflowedSmallWidth`] once the
    /// caller knows the individual counters themselves have not overflowed.
    fn reestablish_total_count(&self) {
        let mut total = 0_i64;
        for index in 0..self.len() {
            total = total.saturating_add(self.count_at(index));
        }
        self.set_total_count(total.max(0) as u64);
    }

    /// Overwrites `total_count` directly (used by
    /// [`Counts::reestablish_total_count`] and by the codec decoder).
    fn set_total_count(&self, value: u64);
}
