// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! High Dynamic Range histograms: bucketed counts storage with a bounded
//! relative error, coordinated-omission correction, and percentile/mean/
//! stddev queries over the recorded distribution.
//!
//! The bucket-math layout ([`config::Config`]) and the counter-slot storage
//! policy ([`counts::Counts`]) are deliberately decoupled from the
//! record/query surface ([`Histogram`]), so the same algorithms work whether
//! counts live behind plain integers, atomics, a mutex, or the sparse packed
//! representation.

#![deny(clippy::all)]

mod config;
mod counts;
mod error;
mod histogram;
mod iter;

pub use config::Config;
pub use counts::{AtomicCounts, Counts, PackedCounts, PlainCounts16, PlainCounts32, PlainCounts64, Synchronized};
pub use error::Error;
pub use histogram::{Builder, Histogram};
pub use iter::{
    AllValues, HistogramIterationValue, LinearValues, LogarithmicValues, PercentileValues,
    RecordedValues,
};
