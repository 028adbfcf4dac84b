// Copyright 2019-2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

native!(
    /// An unsigned pointer-sized integer which can be shared between threads
    pub struct AtomicUsize: usize = core::sync::atomic::AtomicUsize;
);

// additional traits
arithmetic!(AtomicUsize, usize);

impl Unsigned for AtomicUsize {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load() {
        let atomic = AtomicUsize::new(0);
        assert_eq!(atomic.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn store() {
        let atomic = AtomicUsize::new(0);
        atomic.store(1, Ordering::SeqCst);
        assert_eq!(atomic.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn swap() {
        let atomic = AtomicUsize::new(0);
        assert_eq!(atomic.swap(1, Ordering::SeqCst), 0);
    }

    #[test]
    fn compare_exchange() {
        let atomic = AtomicUsize::new(0);
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
        let atomic = AtomicUsize::new(0);
        assert_eq!(atomic.fetch_add(1, Ordering::SeqCst), 0);
        assert_eq!(atomic.load(Ordering::SeqCst), 1);
    }
}
