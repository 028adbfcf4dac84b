// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{criterion_group, criterion_main, Criterion};
use hdrhistogram::{Histogram, PlainCounts64};

fn record(c: &mut Criterion) {
    let histogram: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
    c.bench_function("record plain", |b| {
        b.iter(|| histogram.record(12_345).unwrap())
    });
}

fn value_at_percentile(c: &mut Criterion) {
    let histogram: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
    for value in 0..100_000 {
        histogram.record(value).unwrap();
    }
    c.bench_function("value_at_percentile plain", |b| {
        b.iter(|| histogram.value_at_percentile(99.9))
    });
}

criterion_group!(benches, record, value_at_percentile);
criterion_main!(benches);
