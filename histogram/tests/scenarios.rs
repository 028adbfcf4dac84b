// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use hdrhistogram::{Histogram, PlainCounts64};

fn within_relative_error(actual: u64, expected: u64, relative: f64) -> bool {
    let diff = (actual as f64 - expected as f64).abs();
    diff <= expected as f64 * relative
}

#[test]
fn basic_record() {
    let h: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
    h.record(12_340).unwrap();
    assert_eq!(h.total_count(), 1);
    assert!(within_relative_error(h.value_at_percentile(50.0), 12_340, 0.001));
}

#[test]
fn coordinated_omission_backfills_exact_values() {
    let h: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
    h.record_corrected(1_000, 250).unwrap();
    assert_eq!(h.total_count(), 4);
    for value in [250_u64, 500, 750, 1_000] {
        assert_eq!(h.count_at_value(value).unwrap(), 1, "value {value}");
    }
}

#[test]
fn ten_thousand_fast_samples_and_one_slow_one() {
    let h: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
    for _ in 0..10_000 {
        h.record(1_000).unwrap();
    }
    h.record(100_000_000).unwrap();

    assert!(within_relative_error(h.max().unwrap(), 100_000_000, 0.001));
    assert!(within_relative_error(h.value_at_percentile(99.99), 1_000, 0.001));
    assert!(within_relative_error(h.value_at_percentile(99.999), 100_000_000, 0.001));
}

#[test]
fn coordinated_omission_corrected_variant() {
    let h: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
    for _ in 0..10_000 {
        h.record_corrected(1_000, 10_000).unwrap();
    }
    h.record_corrected(100_000_000, 10_000).unwrap();

    assert_eq!(h.total_count(), 20_000);
    assert!(within_relative_error(h.value_at_percentile(50.0), 1_000, 0.05));
    assert!(within_relative_error(
        h.value_at_percentile(75.0),
        50_000_000,
        0.05
    ));
}
