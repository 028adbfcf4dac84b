// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Errors from encoding or decoding a histogram wire format.
#[derive(Error, Debug)]
pub enum Error {
    #[error("histogram error: {0}")]
    Histogram(#[from] hdrhistogram::Error),
    #[error("unrecognized cookie {0:#x}")]
    CookieMismatch(i32),
    #[error("malformed payload: {0}")]
    Malformed(&'static str),
    #[error("failed to inflate compressed payload: {0}")]
    InflateFailure(String),
    #[error("failed to deflate payload: {0}")]
    DeflateFailure(String),
    #[error("interval log line is malformed: {0}")]
    MalformedLogLine(&'static str),
    #[error("interval log line contains invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}
