// Copyright 2020 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{criterion_group, criterion_main, Criterion};
use hdrhistogram::AtomicCounts;
use hdrhistogram_recorder::IntervalRecorder;

fn update(c: &mut Criterion) {
    let recorder: IntervalRecorder<AtomicCounts> =
        IntervalRecorder::new(1, 3_600_000_000, 3).unwrap();
    c.bench_function("interval recorder update", |b| {
        b.iter(|| recorder.update(|h| h.record(12_345).unwrap()))
    });
}

fn sample(c: &mut Criterion) {
    let recorder: IntervalRecorder<AtomicCounts> =
        IntervalRecorder::new(1, 3_600_000_000, 3).unwrap();
    c.bench_function("interval recorder sample", |b| {
        b.iter(|| {
            recorder.update(|h| h.record(12_345).unwrap());
            recorder.sample().reset();
        })
    });
}

criterion_group!(benches, update, sample);
criterion_main!(benches);
