// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{criterion_group, criterion_main, Criterion};
use hdrhistogram::{AtomicCounts, Histogram};
use std::sync::Arc;
use std::thread;

fn record(c: &mut Criterion) {
    let histogram: Histogram<AtomicCounts> = Histogram::new(1, 3_600_000_000, 3).unwrap();
    c.bench_function("record atomic", |b| {
        b.iter(|| histogram.record(12_345).unwrap())
    });
}

fn record_contended(c: &mut Criterion) {
    let histogram: Arc<Histogram<AtomicCounts>> =
        Arc::new(Histogram::new(1, 3_600_000_000, 3).unwrap());
    c.bench_function("record atomic 4 threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let histogram = Arc::clone(&histogram);
                    thread::spawn(move || {
                        for _ in 0..100 {
                            histogram.record(12_345).unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        })
    });
}

criterion_group!(benches, record, record_contended);
criterion_main!(benches);
