// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Binary wire encoding (§4.10, component H) for [`hdrhistogram`] histograms:
//! the plain V2 frame, its deflate-compressed framing, and the textual
//! interval-log line format built on top of the compressed frame.

#![deny(clippy::all)]

mod decode;
mod encode;
mod error;
mod interval_log;
mod varint;

pub use decode::{decode, decode_into};
pub use encode::{encode, encode_compressed};
pub use error::Error;
pub use interval_log::{format_line, parse_line, IntervalLogLine};

/// `word_size` this crate always encodes with: every counts-storage policy
/// stores counts as `i64` internally (see [`hdrhistogram::Counts`]), so
/// there's no narrower on-wire width to pick.
const WORD_SIZE: i32 = 8;

const PLAIN_COOKIE_BASE: i32 = 0x1c84_9301;
const COMPRESSED_COOKIE_BASE: i32 = 0x1c84_9303;
