// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Interval-log line format (§4.10): one text line per sampled interval,
//! carrying the sample's timing alongside a base64'd compressed histogram
//! frame.

use crate::decode::decode;
use crate::encode::encode_compressed;
use crate::Error;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hdrhistogram::{Counts, Histogram};

/// One decoded line of an interval log.
pub struct IntervalLogLine<C: Counts> {
    /// Seconds between the log's start time and this interval's start.
    pub start_offset_seconds: f64,
    /// Length of the interval, in seconds.
    pub interval_seconds: f64,
    /// Highest value seen in the interval, in seconds (as HdrHistogram's
    /// own interval-log tooling reports it -- a convenience duplicate of
    /// `histogram.max()` in the log's native unit).
    pub interval_max_seconds: f64,
    /// The decoded histogram for the interval.
    pub histogram: Histogram<C>,
}

/// Formats one interval-log line: `start_offset,interval,interval_max,base64(frame)`.
pub fn format_line<C: Counts>(
    start_offset_seconds: f64,
    interval_seconds: f64,
    interval_max_seconds: f64,
    histogram: &Histogram<C>,
) -> Result<String, Error> {
    let frame = encode_compressed(histogram)?;
    let encoded = STANDARD.encode(frame);
    Ok(format!(
        "{start_offset_seconds},{interval_seconds},{interval_max_seconds},{encoded}"
    ))
}

/// Parses one interval-log line produced by [`format_line`].
pub fn parse_line<C: Counts>(line: &str) -> Result<IntervalLogLine<C>, Error> {
    let mut fields = line.splitn(4, ',');
    let start_offset_seconds: f64 = fields
        .next()
        .ok_or(Error::MalformedLogLine("missing start offset"))?
        .parse()
        .map_err(|_| Error::MalformedLogLine("start offset is not a number"))?;
    let interval_seconds: f64 = fields
        .next()
        .ok_or(Error::MalformedLogLine("missing interval"))?
        .parse()
        .map_err(|_| Error::MalformedLogLine("interval is not a number"))?;
    let interval_max_seconds: f64 = fields
        .next()
        .ok_or(Error::MalformedLogLine("missing interval max"))?
        .parse()
        .map_err(|_| Error::MalformedLogLine("interval max is not a number"))?;
    let encoded = fields
        .next()
        .ok_or(Error::MalformedLogLine("missing histogram payload"))?;

    let frame = STANDARD.decode(encoded.trim())?;
    let histogram = decode(&frame)?;

    Ok(IntervalLogLine {
        start_offset_seconds,
        interval_seconds,
        interval_max_seconds,
        histogram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdrhistogram::PlainCounts64;

    #[test]
    fn line_round_trips() {
        let histogram: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        histogram.record(1_000_000).unwrap();

        let line = format_line(0.0, 1.0, 1.0, &histogram).unwrap();
        let parsed: IntervalLogLine<PlainCounts64> = parse_line(&line).unwrap();

        assert_eq!(parsed.start_offset_seconds, 0.0);
        assert_eq!(parsed.interval_seconds, 1.0);
        assert_eq!(parsed.histogram.total_count(), 1);
    }

    #[test]
    fn malformed_line_is_rejected() {
        let result: Result<IntervalLogLine<PlainCounts64>, Error> = parse_line("not,enough");
        assert!(matches!(result, Err(Error::MalformedLogLine(_))));
    }
}
