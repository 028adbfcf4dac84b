// Copyright 2019-2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

native!(
    /// A signed 64 bit integer which can be shared between threads
    pub struct AtomicI64: i64 = core::sync::atomic::AtomicI64;
);

// additional traits
arithmetic!(AtomicI64, i64);

impl Signed for AtomicI64 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load() {
        let atomic = AtomicI64::new(0);
        assert_eq!(atomic.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn store() {
        let atomic = AtomicI64::new(0);
        atomic.store(1, Ordering::SeqCst);
        assert_eq!(atomic.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn swap() {
        let atomic = AtomicI64::new(0);
        assert_eq!(atomic.swap(1, Ordering::SeqCst), 0);
    }

    #[test]
    fn compare_exchange() {
        let atomic = AtomicI64::new(0);
        assert_eq!(
            atomic.compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst),
            Ok(0)
        );
        assert_eq!(
            atomic.compare_exchange(0, 2, Ordering::SeqCst, Ordering::SeqCst),
            Err(1)
        );
    }

    #[test]
    fn fetch_add() {
        let atomic = AtomicI64::new(0);
        assert_eq!(atomic.fetch_add(1, Ordering::SeqCst), 0);
        assert_eq!(atomic.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fetch_add_negative() {
        let atomic = AtomicI64::new(0);
        assert_eq!(atomic.fetch_add(-1, Ordering::SeqCst), 0);
        assert_eq!(atomic.load(Ordering::SeqCst), -1);
    }
}
