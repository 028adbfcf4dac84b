// Copyright 2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use hdrhistogram::Error as HistogramError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("histogram error: {0}")]
    /// A recording or query against one of the interval recorder's
    /// histograms failed.
    Histogram(#[from] HistogramError),
}
