// Copyright 2019-2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A small collection of atomic types unified through traits, so that code
//! which needs to be generic over atomic width (histogram counts, phaser
//! epochs, packed-array words) can be written once.

#![deny(clippy::all)]

#[macro_use]
mod macros;

mod traits;
mod types;

pub use crate::traits::*;
pub use crate::types::*;

pub use core::sync::atomic::Ordering;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usize() {
        let x = AtomicUsize::new(0);
        assert_eq!(x.load(Ordering::SeqCst), 0_usize);
        x.store(42, Ordering::SeqCst);
        assert_eq!(x.load(Ordering::SeqCst), 42_usize);
    }
}
