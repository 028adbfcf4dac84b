// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Possible errors returned by operations on a [`crate::Histogram`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("value is outside of the histogram's trackable range")]
    /// The value could not be recorded because it falls outside of
    /// `[0, highest_trackable_value]`.
    OutOfRange,
    #[error("histogram configuration is invalid")]
    /// `highest_trackable_value` was smaller than `2 * lowest_discernible_value`,
    /// `lowest_discernible_value` was zero, or `significant_value_digits` was
    /// outside of `0..=5`.
    InvalidConfig,
    #[error("histograms have incompatible bucketing configurations")]
    /// `add`, `subtract`, or `copy_into` was called with a histogram whose
    /// `sub_bucket_count`, `bucket_count`, or `unit_magnitude` differ from the
    /// receiver's.
    IncompatibleHistograms,
    #[error("subtracting would drive a count below zero")]
    /// `subtract` would have produced a negative count at some index.
    NegativeCountAfterSubtract,
    #[error("a counter or the total count overflowed its storage width")]
    /// A narrow-width counts array overflowed. The histogram remains usable,
    /// but query results are unreliable until [`crate::Histogram::reestablish_total_count`]
    /// is called (and the individual overflowed counters can never be trusted
    /// again).
    OverflowedSmallWidth,
}
