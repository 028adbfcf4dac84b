// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::counts::Counts;
use crate::Error;
use std::marker::PhantomData;
use std::sync::Mutex;

/// Wraps any non-atomic [`Counts`] policy behind a single mutex, matching
/// the "Synchronized" concurrency policy of §4.2: every operation, including
/// reads, takes the lock for its own duration rather than relying on
/// per-slot atomics.
pub struct Synchronized<C: Counts> {
    inner: Mutex<C>,
    _marker: PhantomData<C>,
}

impl<C: Counts> Counts for Synchronized<C> {
    fn with_len(len: usize) -> Self {
        Self {
            inner: Mutex::new(C::with_len(len)),
            _marker: PhantomData,
        }
    }

    fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    fn count_at(&self, index: usize) -> i64 {
        self.inner.lock().unwrap().count_at(index)
    }

    fn add_count_at(&self, index: usize, delta: i64) -> Result<(), Error> {
        self.inner.lock().unwrap().add_count_at(index, delta)
    }

    fn sub_count_at(&self, index: usize, delta: i64) -> Result<(), Error> {
        self.inner.lock().unwrap().sub_count_at(index, delta)
    }

    fn set_count_at(&self, index: usize, value: i64) {
        self.inner.lock().unwrap().set_count_at(index, value)
    }

    fn clear(&self) {
        self.inner.lock().unwrap().clear()
    }

    fn total_count(&self) -> u64 {
        self.inner.lock().unwrap().total_count()
    }

    fn min_value(&self) -> i64 {
        self.inner.lock().unwrap().min_value()
    }

    fn max_value(&self) -> i64 {
        self.inner.lock().unwrap().max_value()
    }

    fn track_value(&self, value: i64) {
        self.inner.lock().unwrap().track_value(value)
    }

    fn reestablish_total_count(&self) {
        self.inner.lock().unwrap().reestablish_total_count()
    }

    fn set_total_count(&self, value: u64) {
        self.inner.lock().unwrap().set_total_count(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::PlainCounts64;

    #[test]
    fn locks_for_every_operation() {
        let counts: Synchronized<PlainCounts64> = Synchronized::with_len(4);
        counts.add_count_at(1, 3).unwrap();
        assert_eq!(counts.count_at(1), 3);
        assert_eq!(counts.total_count(), 3);
    }
}
