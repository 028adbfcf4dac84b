// Copyright 2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Writer/reader phaser (component F): separates writer critical sections
//! from reader phase flips without ever making a writer block on a reader.
//!
//! Phase is encoded by the sign of `start_epoch` -- non-negative is the even
//! phase, negative is the odd phase. Each phase has its own "end epoch"
//! counter that writers bump on critical-section exit; a reader flips the
//! phase by swapping `start_epoch` to the new phase's initial value, then
//! waits for the *prior* phase's end-epoch to catch up to the value it
//! captured at the swap -- at that point every writer that was in the prior
//! phase has exited.

use hdrhistogram_atomics::{Arithmetic, Atomic, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

pub struct Phaser {
    start_epoch: AtomicI64,
    even_end_epoch: AtomicI64,
    odd_end_epoch: AtomicI64,
    reader_lock: Mutex<()>,
}

impl Default for Phaser {
    fn default() -> Self {
        Self::new()
    }
}

impl Phaser {
    pub fn new() -> Self {
        Self {
            start_epoch: AtomicI64::new(0),
            even_end_epoch: AtomicI64::new(0),
            odd_end_epoch: AtomicI64::new(i64::MIN),
            reader_lock: Mutex::new(()),
        }
    }

    /// Enters a writer critical section, returning the value to later pass
    /// to [`Phaser::writer_critical_section_exit`].
    pub fn writer_critical_section_enter(&self) -> i64 {
        self.start_epoch.fetch_add(1, Ordering::SeqCst)
    }

    /// Exits a writer critical section previously entered with
    /// `critical_value_at_enter`.
    pub fn writer_critical_section_exit(&self, critical_value_at_enter: i64) {
        if critical_value_at_enter < 0 {
            self.odd_end_epoch.fetch_add(1, Ordering::SeqCst);
        } else {
            self.even_end_epoch.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Acquires the reader lock, serializing concurrent readers. Hold the
    /// returned guard across both [`Phaser::flip_phase`] and whatever
    /// active/inactive pointer swap precedes it -- the two must happen as
    /// one atomic step from a reader's point of view.
    pub fn reader_lock(&self) -> MutexGuard<'_, ()> {
        self.reader_lock.lock().unwrap()
    }

    /// Flips the current phase and blocks until every writer that entered
    /// the prior phase has exited. The caller must already hold the guard
    /// from [`Phaser::reader_lock`].
    ///
    /// `sleep` controls the drain loop's backoff: `Duration::ZERO` yields
    /// the thread between checks; any other duration sleeps for that long.
    pub fn flip_phase(&self, _reader_guard: &MutexGuard<'_, ()>, sleep: Duration) {
        let next_phase_even = self.start_epoch.load(Ordering::SeqCst) < 0;
        let initial_start_value = if next_phase_even { 0 } else { i64::MIN };

        if next_phase_even {
            self.even_end_epoch.store(initial_start_value, Ordering::SeqCst);
        } else {
            self.odd_end_epoch.store(initial_start_value, Ordering::SeqCst);
        }

        let start_value_at_flip = self.start_epoch.swap(initial_start_value, Ordering::SeqCst);

        let mut spins = 0_u64;
        loop {
            let caught_up = if next_phase_even {
                self.odd_end_epoch.load(Ordering::SeqCst) == start_value_at_flip
            } else {
                self.even_end_epoch.load(Ordering::SeqCst) == start_value_at_flip
            };
            if caught_up {
                break;
            }
            spins += 1;
            if sleep.is_zero() {
                thread::yield_now();
            } else {
                thread::sleep(sleep);
            }
        }
        log::trace!("flip_phase drained after {spins} spin iterations");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_phase_returns_immediately_with_no_writers() {
        let phaser = Phaser::new();
        let guard = phaser.reader_lock();
        phaser.flip_phase(&guard, Duration::ZERO);
        drop(guard);
        let guard = phaser.reader_lock();
        phaser.flip_phase(&guard, Duration::ZERO);
    }

    #[test]
    fn flip_phase_waits_for_in_flight_writer() {
        let phaser = Phaser::new();
        let critical_value = phaser.writer_critical_section_enter();
        phaser.writer_critical_section_exit(critical_value);
        let guard = phaser.reader_lock();
        phaser.flip_phase(&guard, Duration::ZERO);
    }

    #[test]
    fn alternates_even_and_odd_phases() {
        let phaser = Phaser::new();
        assert!(phaser.start_epoch.load(Ordering::SeqCst) >= 0);
        let guard = phaser.reader_lock();
        phaser.flip_phase(&guard, Duration::ZERO);
        drop(guard);
        assert!(phaser.start_epoch.load(Ordering::SeqCst) < 0);
        let guard = phaser.reader_lock();
        phaser.flip_phase(&guard, Duration::ZERO);
        drop(guard);
        assert!(phaser.start_epoch.load(Ordering::SeqCst) >= 0);
    }
}
