// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::varint::{write_zigzag_i32, write_zigzag_i64};
use crate::{Error, PLAIN_COOKIE_BASE, WORD_SIZE};
use byteorder::{BigEndian, WriteBytesExt};
use hdrhistogram::{Counts, Histogram};
use std::io::Write;

/// Encodes the payload (the `(index_delta, count)` stream) without the
/// surrounding header. A negative `index_delta` stands alone and denotes a
/// run of that many consecutive zero counts; any other `index_delta` is
/// always `1` and is followed by the absolute count at that index.
fn encode_payload<C: Counts>(histogram: &Histogram<C>) -> Vec<u8> {
    let mut payload = Vec::new();
    let mut zero_run = 0_i64;
    for index in 0..histogram.counts_len() {
        let count = histogram.count_at_index(index);
        if count == 0 {
            zero_run += 1;
            continue;
        }
        if zero_run > 0 {
            write_zigzag_i32(&mut payload, -(zero_run as i32));
            zero_run = 0;
        }
        write_zigzag_i32(&mut payload, 1);
        write_zigzag_i64(&mut payload, count);
    }
    if zero_run > 0 {
        write_zigzag_i32(&mut payload, -(zero_run as i32));
    }
    payload
}

/// Encodes `histogram` as a plain V2 frame (§4.10): big-endian header
/// followed by the zigzag varint payload.
pub fn encode<C: Counts>(histogram: &Histogram<C>) -> Vec<u8> {
    let payload = encode_payload(histogram);
    let config = histogram.config();

    // Writes into a `Vec<u8>` are infallible; `expect` documents that.
    let mut frame = Vec::with_capacity(32 + payload.len());
    frame
        .write_i32::<BigEndian>(PLAIN_COOKIE_BASE + (WORD_SIZE << 4))
        .expect("write to Vec cannot fail");
    frame
        .write_i32::<BigEndian>(payload.len() as i32)
        .expect("write to Vec cannot fail");
    frame.write_i32::<BigEndian>(0).expect("write to Vec cannot fail"); // normalizing_index_offset: unused by this crate
    frame
        .write_i32::<BigEndian>(i32::from(config.significant_value_digits()))
        .expect("write to Vec cannot fail");
    frame
        .write_i64::<BigEndian>(config.lowest_discernible_value() as i64)
        .expect("write to Vec cannot fail");
    frame
        .write_i64::<BigEndian>(config.highest_trackable_value() as i64)
        .expect("write to Vec cannot fail");
    frame
        .write_f64::<BigEndian>(1.0)
        .expect("write to Vec cannot fail"); // integer_to_double_conversion_ratio
    frame.extend_from_slice(&payload);
    frame
}

/// Encodes `histogram` as a compressed frame (§4.10): the plain V2 frame,
/// deflate-compressed, behind its own cookie and length header.
pub fn encode_compressed<C: Counts>(histogram: &Histogram<C>) -> Result<Vec<u8>, Error> {
    use crate::COMPRESSED_COOKIE_BASE;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;

    let plain = encode(histogram);
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&plain)
        .map_err(|e| Error::DeflateFailure(e.to_string()))?;
    let deflated = encoder
        .finish()
        .map_err(|e| Error::DeflateFailure(e.to_string()))?;

    let mut frame = Vec::with_capacity(8 + deflated.len());
    frame
        .write_i32::<BigEndian>(COMPRESSED_COOKIE_BASE + (WORD_SIZE << 4))
        .expect("write to Vec cannot fail");
    frame
        .write_i32::<BigEndian>(deflated.len() as i32)
        .expect("write to Vec cannot fail");
    frame.extend_from_slice(&deflated);
    Ok(frame)
}
