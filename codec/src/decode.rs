// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::varint::{read_zigzag_i32, read_zigzag_i64};
use crate::{Error, COMPRESSED_COOKIE_BASE, PLAIN_COOKIE_BASE};
use byteorder::{BigEndian, ReadBytesExt};
use hdrhistogram::{Counts, Histogram};
use std::io::{Cursor, Read};

const WORD_SIZES: [i32; 3] = [2, 4, 8];

fn cookie_word_size(cookie: i32, base: i32) -> Option<i32> {
    WORD_SIZES
        .iter()
        .copied()
        .find(|word_size| cookie == base + (word_size << 4))
}

/// Decodes a histogram from either framing of §4.10, building a fresh
/// histogram with the parameters carried in the frame.
pub fn decode<C: Counts>(bytes: &[u8]) -> Result<Histogram<C>, Error> {
    let mut cursor = Cursor::new(bytes);
    let cookie = cursor
        .read_i32::<BigEndian>()
        .map_err(|_| Error::Malformed("truncated cookie"))?;

    if cookie_word_size(cookie, PLAIN_COOKIE_BASE).is_some() {
        decode_plain(&bytes[4..])
    } else if cookie_word_size(cookie, COMPRESSED_COOKIE_BASE).is_some() {
        let deflated_len = cursor
            .read_i32::<BigEndian>()
            .map_err(|_| Error::Malformed("truncated deflate length"))? as usize;
        let start = cursor.position() as usize;
        let deflated = bytes
            .get(start..start + deflated_len)
            .ok_or(Error::Malformed("truncated deflate payload"))?;

        let mut inflated = Vec::new();
        flate2::read::DeflateDecoder::new(deflated)
            .read_to_end(&mut inflated)
            .map_err(|e| Error::InflateFailure(e.to_string()))?;
        decode_plain(&inflated)
    } else {
        log::debug!("histogram decode saw unrecognized cookie {cookie:#x}");
        Err(Error::CookieMismatch(cookie))
    }
}

/// Decodes into an existing histogram, requiring its bucketing parameters
/// to match the frame's.
pub fn decode_into<C: Counts>(bytes: &[u8], target: &Histogram<C>) -> Result<(), Error> {
    let decoded: Histogram<C> = decode(bytes)?;
    let a = target.config();
    let b = decoded.config();
    if a.lowest_discernible_value() != b.lowest_discernible_value()
        || a.highest_trackable_value() != b.highest_trackable_value()
        || a.significant_value_digits() != b.significant_value_digits()
    {
        return Err(Error::Histogram(hdrhistogram::Error::IncompatibleHistograms));
    }
    target.reset();
    for index in 0..target.counts_len() {
        target.set_count_at_index(index, decoded.count_at_index(index));
    }
    target.recompute_aggregates();
    Ok(())
}

fn decode_plain<C: Counts>(bytes: &[u8]) -> Result<Histogram<C>, Error> {
    let mut cursor = Cursor::new(bytes);
    let payload_length = cursor
        .read_i32::<BigEndian>()
        .map_err(|_| Error::Malformed("truncated payload length"))?;
    let _normalizing_index_offset = cursor
        .read_i32::<BigEndian>()
        .map_err(|_| Error::Malformed("truncated normalizing index offset"))?;
    let significant_value_digits = cursor
        .read_i32::<BigEndian>()
        .map_err(|_| Error::Malformed("truncated significant value digits"))?;
    let lowest_discernible_value = cursor
        .read_i64::<BigEndian>()
        .map_err(|_| Error::Malformed("truncated lowest discernible value"))?;
    let highest_trackable_value = cursor
        .read_i64::<BigEndian>()
        .map_err(|_| Error::Malformed("truncated highest trackable value"))?;
    let _conversion_ratio = cursor
        .read_f64::<BigEndian>()
        .map_err(|_| Error::Malformed("truncated conversion ratio"))?;

    let header_len = cursor.position() as usize;
    let payload = bytes
        .get(header_len..header_len + payload_length as usize)
        .ok_or(Error::Malformed("payload shorter than declared length"))?;

    let histogram: Histogram<C> = Histogram::new(
        lowest_discernible_value as u64,
        highest_trackable_value as u64,
        significant_value_digits as u8,
    )?;

    let mut index = 0_usize;
    let mut payload_cursor = 0_usize;
    while payload_cursor < payload.len() {
        let marker = read_zigzag_i32(payload, &mut payload_cursor)?;
        if marker < 0 {
            index += (-marker) as usize;
            continue;
        }
        let count = read_zigzag_i64(payload, &mut payload_cursor)?;
        if index >= histogram.counts_len() {
            return Err(Error::Malformed("index out of range"));
        }
        histogram.set_count_at_index(index, count);
        index += marker as usize;
    }
    histogram.recompute_aggregates();
    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode, encode_compressed};
    use hdrhistogram::PlainCounts64;

    #[test]
    fn plain_round_trip_preserves_counts() {
        let original: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        for value in [100, 200, 200, 300] {
            original.record(value).unwrap();
        }
        let frame = encode(&original);
        let decoded: Histogram<PlainCounts64> = decode(&frame).unwrap();
        assert_eq!(decoded.total_count(), original.total_count());
        assert_eq!(decoded.min(), original.min());
        assert_eq!(decoded.max(), original.max());
        for index in 0..original.counts_len() {
            assert_eq!(
                decoded.count_at_index(index),
                original.count_at_index(index)
            );
        }
    }

    #[test]
    fn compressed_round_trip_preserves_counts() {
        let original: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        for _ in 0..10_000 {
            original.record(1_000).unwrap();
        }
        original.record(100_000_000).unwrap();

        let frame = encode_compressed(&original).unwrap();
        let decoded: Histogram<PlainCounts64> = decode(&frame).unwrap();
        assert_eq!(decoded.total_count(), original.total_count());
        assert_eq!(decoded.min(), original.min());
        assert_eq!(decoded.max(), original.max());
    }

    #[test]
    fn unrecognized_cookie_is_rejected() {
        let result: Result<Histogram<PlainCounts64>, Error> = decode(&[0, 0, 0, 0]);
        assert!(matches!(result, Err(Error::CookieMismatch(0))));
    }
}
