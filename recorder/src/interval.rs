// Copyright 2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Interval recorder (component G): an active/inactive pair of histograms
//! behind a [`Phaser`], so writers never block on a reader pulling a
//! consistent snapshot of the interval's recordings.

use crate::phaser::Phaser;
use hdrhistogram::{Builder, Counts, Histogram};
use hdrhistogram_atomics::{Atomic, AtomicUsize, Ordering};
use std::time::Duration;

/// Holds two histograms, `active` and `inactive`, conforming to the same
/// bucketing parameters. Writers record into whichever histogram is
/// currently active; `sample()` atomically swaps the two and returns the
/// one that was active, now guaranteed free of in-flight writers.
pub struct IntervalRecorder<C: Counts> {
    phaser: Phaser,
    histograms: [Histogram<C>; 2],
    active: AtomicUsize,
}

impl<C: Counts> IntervalRecorder<C> {
    /// Builds an interval recorder whose two histograms share the given
    /// bucketing parameters.
    pub fn new(
        lowest_discernible_value: u64,
        highest_trackable_value: u64,
        significant_value_digits: u8,
    ) -> Result<Self, hdrhistogram::Error> {
        let build = || {
            Builder::new()
                .lowest_discernible_value(lowest_discernible_value)
                .highest_trackable_value(highest_trackable_value)
                .significant_value_digits(significant_value_digits)
                .build::<C>()
        };
        Ok(Self {
            phaser: Phaser::new(),
            histograms: [build()?, build()?],
            active: AtomicUsize::new(0),
        })
    }

    /// Runs `action` against the currently-active histogram inside a writer
    /// critical section. `action` must only record -- it must not iterate
    /// or otherwise structurally mutate the histogram.
    pub fn update<F>(&self, action: F)
    where
        F: FnOnce(&Histogram<C>),
    {
        let critical_value = self.phaser.writer_critical_section_enter();
        let active = self.active.load(Ordering::SeqCst);
        action(&self.histograms[active]);
        self.phaser.writer_critical_section_exit(critical_value);
    }

    /// Swaps the active and inactive histograms and waits for every writer
    /// that was in the now-inactive one to finish, then returns it. The
    /// caller typically drains and then resets it before the next sample.
    pub fn sample(&self) -> &Histogram<C> {
        let guard = self.phaser.reader_lock();
        let previous_active = self.active.load(Ordering::SeqCst);
        self.active.store(1 - previous_active, Ordering::SeqCst);
        self.phaser.flip_phase(&guard, Duration::ZERO);
        &self.histograms[previous_active]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdrhistogram::{AtomicCounts, PlainCounts64};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn every_update_lands_in_exactly_one_sample() {
        let recorder: IntervalRecorder<PlainCounts64> =
            IntervalRecorder::new(1, 3_600_000_000, 3).unwrap();
        recorder.update(|h| h.record(100).unwrap());
        recorder.update(|h| h.record(200).unwrap());

        let sampled = recorder.sample();
        assert_eq!(sampled.total_count(), 2);
        sampled.reset();

        recorder.update(|h| h.record(300).unwrap());
        let sampled = recorder.sample();
        assert_eq!(sampled.total_count(), 1);
    }

    #[test]
    fn concurrent_writers_and_sampler_account_for_every_update() {
        let recorder: Arc<IntervalRecorder<AtomicCounts>> =
            Arc::new(IntervalRecorder::new(1, 3_600_000_000, 3).unwrap());
        let writers = 4;
        let per_writer = 500;

        let handles: Vec<_> = (0..writers)
            .map(|_| {
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    for _ in 0..per_writer {
                        recorder.update(|h| h.record(100).unwrap());
                    }
                })
            })
            .collect();

        let mut observed = 0_u64;
        // Sample a few times while writers are still running, then drain
        // whatever's left once they finish.
        for _ in 0..5 {
            observed += recorder.sample().total_count();
            thread::yield_now();
        }
        for handle in handles {
            handle.join().unwrap();
        }
        observed += recorder.sample().total_count();

        assert_eq!(observed, writers * per_writer);
    }
}
