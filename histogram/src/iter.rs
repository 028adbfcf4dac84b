// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Iterators and percentile/mean/stddev queries over a recorded histogram
//! (component D).
//!
//! Every iterator variant shares the same *cursor*: a walk over the counts
//! array from low to high, accumulating `total_count`/`total_value` as it
//! goes. Variants differ only in which indices they stop and report on.

use crate::counts::Counts;
use crate::Histogram;

/// One reported step of a histogram iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistogramIterationValue {
    /// The highest value equivalent to the reporting boundary this step
    /// reached.
    pub value_iterated_to: u64,
    /// The reporting boundary the previous step reached (0 for the first
    /// step).
    pub value_iterated_from: u64,
    /// The raw counts-array value at `value_iterated_to`'s index.
    pub count_at_value_iterated_to: u64,
    /// How much of `total_count_to_this_value` was added in this step.
    pub count_added_in_this_iteration_step: u64,
    /// Running total of counts through this step.
    pub total_count_to_this_value: u64,
    /// Running total of `count * median_equivalent(value)` through this
    /// step.
    pub total_value_to_this_value: u64,
    /// `100 * total_count_to_this_value / total_count`.
    pub percentile: f64,
    /// The percentile the reporting level was targeting (identical to
    /// `percentile` for the All/Recorded/Linear/Logarithmic variants; for
    /// `Percentile` iteration it is the exact reporting boundary, which can
    /// run slightly ahead of the percentile actually reached).
    pub percentile_level_iterated_to: f64,
}

struct Cursor {
    next_index: usize,
    total_count_to_index: u64,
    total_value_to_index: u64,
    previous_value_iterated_to: u64,
}

impl Cursor {
    fn new() -> Self {
        Self {
            next_index: 0,
            total_count_to_index: 0,
            total_value_to_index: 0,
            previous_value_iterated_to: 0,
        }
    }
}

fn step_value<C: Counts>(
    histogram: &Histogram<C>,
    cursor: &mut Cursor,
    index: usize,
    total_count: u64,
) -> HistogramIterationValue {
    let count = histogram.count_at_index(index) as u64;
    let raw_value = histogram.config().value_from_counts_index(index);
    let median = histogram.config().median_equivalent(raw_value);
    let highest = histogram.config().highest_equivalent(raw_value);

    cursor.total_count_to_index += count;
    cursor.total_value_to_index += count * median;

    let value = HistogramIterationValue {
        value_iterated_to: highest,
        value_iterated_from: cursor.previous_value_iterated_to,
        count_at_value_iterated_to: count,
        count_added_in_this_iteration_step: count,
        total_count_to_this_value: cursor.total_count_to_index,
        total_value_to_this_value: cursor.total_value_to_index,
        percentile: if total_count == 0 {
            0.0
        } else {
            100.0 * cursor.total_count_to_index as f64 / total_count as f64
        },
        percentile_level_iterated_to: if total_count == 0 {
            0.0
        } else {
            100.0 * cursor.total_count_to_index as f64 / total_count as f64
        },
    };
    cursor.previous_value_iterated_to = highest;
    value
}

/// Every sub-bucket, whether or not it has a non-zero count.
pub struct AllValues<'h, C: Counts> {
    histogram: &'h Histogram<C>,
    cursor: Cursor,
    total_count: u64,
}

impl<'h, C: Counts> AllValues<'h, C> {
    pub(crate) fn new(histogram: &'h Histogram<C>) -> Self {
        Self {
            histogram,
            cursor: Cursor::new(),
            total_count: histogram.total_count(),
        }
    }
}

impl<'h, C: Counts> Iterator for AllValues<'h, C> {
    type Item = HistogramIterationValue;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.next_index >= self.histogram.counts_len() {
            return None;
        }
        let index = self.cursor.next_index;
        self.cursor.next_index += 1;
        Some(step_value(self.histogram, &mut self.cursor, index, self.total_count))
    }
}

/// Only sub-buckets with a non-zero count.
pub struct RecordedValues<'h, C: Counts> {
    histogram: &'h Histogram<C>,
    cursor: Cursor,
    total_count: u64,
}

impl<'h, C: Counts> RecordedValues<'h, C> {
    pub(crate) fn new(histogram: &'h Histogram<C>) -> Self {
        Self {
            histogram,
            cursor: Cursor::new(),
            total_count: histogram.total_count(),
        }
    }
}

impl<'h, C: Counts> Iterator for RecordedValues<'h, C> {
    type Item = HistogramIterationValue;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor.next_index >= self.histogram.counts_len() {
                return None;
            }
            let index = self.cursor.next_index;
            self.cursor.next_index += 1;
            if self.histogram.count_at_index(index) == 0 {
                // Still folds a zero into the running totals so later steps'
                // `value_iterated_from` stays contiguous.
                let raw_value = self.histogram.config().value_from_counts_index(index);
                self.cursor.previous_value_iterated_to =
                    self.histogram.config().highest_equivalent(raw_value);
                continue;
            }
            return Some(step_value(self.histogram, &mut self.cursor, index, self.total_count));
        }
    }
}

/// Reports at every multiple of `step`, merging however many sub-buckets
/// fall within one step into a single reported value.
pub struct LinearValues<'h, C: Counts> {
    histogram: &'h Histogram<C>,
    cursor: Cursor,
    total_count: u64,
    step: u64,
    next_reporting_level: u64,
    done: bool,
}

impl<'h, C: Counts> LinearValues<'h, C> {
    pub(crate) fn new(histogram: &'h Histogram<C>, step: u64) -> Self {
        Self {
            histogram,
            cursor: Cursor::new(),
            total_count: histogram.total_count(),
            step: step.max(1),
            next_reporting_level: step.max(1),
            done: false,
        }
    }
}

impl<'h, C: Counts> Iterator for LinearValues<'h, C> {
    type Item = HistogramIterationValue;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let len = self.histogram.counts_len();
        loop {
            if self.cursor.next_index >= len {
                self.done = true;
                return None;
            }

            // Skip reporting levels that fall entirely below the lowest
            // equivalent value of the next unconsumed index -- a step finer
            // than the bucket's own resolution would otherwise produce
            // repeated empty iterations.
            let next_index_value = self
                .histogram
                .config()
                .value_from_counts_index(self.cursor.next_index);
            while self
                .histogram
                .config()
                .lowest_equivalent(self.next_reporting_level)
                < next_index_value
            {
                self.next_reporting_level += self.step;
            }

            let index = self.cursor.next_index;
            let highest = self
                .histogram
                .config()
                .highest_equivalent(self.histogram.config().value_from_counts_index(index));
            self.cursor.next_index += 1;
            let reached = highest >= self.next_reporting_level || index + 1 >= len;

            let count = self.histogram.count_at_index(index) as u64;
            let median = self
                .histogram
                .config()
                .median_equivalent(self.histogram.config().value_from_counts_index(index));
            self.cursor.total_count_to_index += count;
            self.cursor.total_value_to_index += count * median;

            if reached {
                let value = HistogramIterationValue {
                    value_iterated_to: highest,
                    value_iterated_from: self.cursor.previous_value_iterated_to,
                    count_at_value_iterated_to: self.histogram.count_at_index(index) as u64,
                    count_added_in_this_iteration_step: count,
                    total_count_to_this_value: self.cursor.total_count_to_index,
                    total_value_to_this_value: self.cursor.total_value_to_index,
                    percentile: if self.total_count == 0 {
                        0.0
                    } else {
                        100.0 * self.cursor.total_count_to_index as f64 / self.total_count as f64
                    },
                    percentile_level_iterated_to: if self.total_count == 0 {
                        0.0
                    } else {
                        100.0 * self.cursor.total_count_to_index as f64 / self.total_count as f64
                    },
                };
                self.cursor.previous_value_iterated_to = value.value_iterated_to;
                self.next_reporting_level += self.step;
                return Some(value);
            }
        }
    }
}

/// Reports at `first * base^n` for increasing `n`.
pub struct LogarithmicValues<'h, C: Counts> {
    histogram: &'h Histogram<C>,
    cursor: Cursor,
    total_count: u64,
    base: f64,
    next_reporting_level: f64,
    done: bool,
}

impl<'h, C: Counts> LogarithmicValues<'h, C> {
    pub(crate) fn new(histogram: &'h Histogram<C>, first: f64, base: f64) -> Self {
        Self {
            histogram,
            cursor: Cursor::new(),
            total_count: histogram.total_count(),
            base,
            next_reporting_level: first,
            done: false,
        }
    }
}

impl<'h, C: Counts> Iterator for LogarithmicValues<'h, C> {
    type Item = HistogramIterationValue;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let len = self.histogram.counts_len();
        loop {
            if self.cursor.next_index >= len {
                self.done = true;
                return None;
            }
            let next_index_value = self
                .histogram
                .config()
                .value_from_counts_index(self.cursor.next_index);
            while self
                .histogram
                .config()
                .lowest_equivalent(self.next_reporting_level as u64)
                < next_index_value
            {
                self.next_reporting_level *= self.base;
            }

            let index = self.cursor.next_index;
            let highest = self
                .histogram
                .config()
                .highest_equivalent(self.histogram.config().value_from_counts_index(index));
            self.cursor.next_index += 1;
            let reached = highest as f64 >= self.next_reporting_level || index + 1 >= len;

            let count = self.histogram.count_at_index(index) as u64;
            let median = self
                .histogram
                .config()
                .median_equivalent(self.histogram.config().value_from_counts_index(index));
            self.cursor.total_count_to_index += count;
            self.cursor.total_value_to_index += count * median;

            if reached {
                let value = HistogramIterationValue {
                    value_iterated_to: highest,
                    value_iterated_from: self.cursor.previous_value_iterated_to,
                    count_at_value_iterated_to: self.histogram.count_at_index(index) as u64,
                    count_added_in_this_iteration_step: count,
                    total_count_to_this_value: self.cursor.total_count_to_index,
                    total_value_to_this_value: self.cursor.total_value_to_index,
                    percentile: if self.total_count == 0 {
                        0.0
                    } else {
                        100.0 * self.cursor.total_count_to_index as f64 / self.total_count as f64
                    },
                    percentile_level_iterated_to: if self.total_count == 0 {
                        0.0
                    } else {
                        100.0 * self.cursor.total_count_to_index as f64 / self.total_count as f64
                    },
                };
                self.cursor.previous_value_iterated_to = value.value_iterated_to;
                self.next_reporting_level *= self.base;
                return Some(value);
            }
        }
    }
}

fn half_distance(percentile: f64) -> f64 {
    let ratio = 100.0 / (100.0 - percentile);
    2_f64.powi(ratio.log2().floor() as i32 + 1)
}

/// Reports at percentile boundaries that get finer as the percentile
/// approaches 100, plus one final step at exactly 100%.
pub struct PercentileValues<'h, C: Counts> {
    histogram: &'h Histogram<C>,
    cursor: Cursor,
    total_count: u64,
    ticks_per_half_distance: u32,
    percentile_to_iterate_to: f64,
    reached_end: bool,
}

impl<'h, C: Counts> PercentileValues<'h, C> {
    pub(crate) fn new(histogram: &'h Histogram<C>, ticks_per_half_distance: u32) -> Self {
        Self {
            histogram,
            cursor: Cursor::new(),
            total_count: histogram.total_count(),
            ticks_per_half_distance: ticks_per_half_distance.max(1),
            percentile_to_iterate_to: 0.0,
            reached_end: false,
        }
    }
}

impl<'h, C: Counts> Iterator for PercentileValues<'h, C> {
    type Item = HistogramIterationValue;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reached_end {
            return None;
        }
        let len = self.histogram.counts_len();
        if self.total_count == 0 {
            self.reached_end = true;
            return None;
        }
        loop {
            if self.cursor.next_index >= len {
                self.reached_end = true;
                return None;
            }
            let index = self.cursor.next_index;
            self.cursor.next_index += 1;

            let count = self.histogram.count_at_index(index) as u64;
            let raw_value = self.histogram.config().value_from_counts_index(index);
            let median = self.histogram.config().median_equivalent(raw_value);
            let highest = self.histogram.config().highest_equivalent(raw_value);
            self.cursor.total_count_to_index += count;
            self.cursor.total_value_to_index += count * median;

            let current_percentile =
                100.0 * self.cursor.total_count_to_index as f64 / self.total_count as f64;
            let is_last_index = index + 1 >= len;

            if current_percentile >= self.percentile_to_iterate_to || is_last_index {
                let level_iterated_to = self.percentile_to_iterate_to;
                let value = HistogramIterationValue {
                    value_iterated_to: highest,
                    value_iterated_from: self.cursor.previous_value_iterated_to,
                    count_at_value_iterated_to: count,
                    count_added_in_this_iteration_step: count,
                    total_count_to_this_value: self.cursor.total_count_to_index,
                    total_value_to_this_value: self.cursor.total_value_to_index,
                    percentile: current_percentile,
                    percentile_level_iterated_to: level_iterated_to.min(100.0),
                };
                self.cursor.previous_value_iterated_to = highest;

                if level_iterated_to >= 100.0 {
                    self.reached_end = true;
                } else {
                    let half = half_distance(self.percentile_to_iterate_to);
                    let increment = 100.0 / (self.ticks_per_half_distance as f64 * half);
                    self.percentile_to_iterate_to =
                        (self.percentile_to_iterate_to + increment).min(100.0);
                }
                return Some(value);
            }
        }
    }
}

impl<C: Counts> Histogram<C> {
    /// Iterates every sub-bucket.
    pub fn iter_all(&self) -> AllValues<'_, C> {
        AllValues::new(self)
    }

    /// Iterates only sub-buckets with non-zero counts.
    pub fn iter_recorded(&self) -> RecordedValues<'_, C> {
        RecordedValues::new(self)
    }

    /// Iterates at linear steps of `step`.
    pub fn iter_linear(&self, step: u64) -> LinearValues<'_, C> {
        LinearValues::new(self, step)
    }

    /// Iterates at `first * base^n` boundaries.
    pub fn iter_logarithmic(&self, first: f64, base: f64) -> LogarithmicValues<'_, C> {
        LogarithmicValues::new(self, first, base)
    }

    /// Iterates at percentile boundaries.
    pub fn iter_percentiles(&self, ticks_per_half_distance: u32) -> PercentileValues<'_, C> {
        PercentileValues::new(self, ticks_per_half_distance)
    }

    /// The value at or below which `percentile` percent of recorded values
    /// fall. Returns 0 for an empty histogram.
    pub fn value_at_percentile(&self, percentile: f64) -> u64 {
        let total_count = self.total_count();
        if total_count == 0 {
            return 0;
        }
        let percentile = percentile.clamp(0.0, 100.0);
        let target = ((percentile * total_count as f64 / 100.0).ceil() as u64).max(1);

        let mut running = 0_u64;
        for index in 0..self.counts_len() {
            running += self.count_at_index(index) as u64;
            if running >= target {
                let raw_value = self.config().value_from_counts_index(index);
                return self.config().highest_equivalent(raw_value);
            }
        }
        0
    }

    /// The arithmetic mean of recorded values, 0 if empty.
    pub fn mean(&self) -> f64 {
        let total_count = self.total_count();
        if total_count == 0 {
            return 0.0;
        }
        let mut total_value = 0_f64;
        for index in 0..self.counts_len() {
            let count = self.count_at_index(index) as f64;
            if count == 0.0 {
                continue;
            }
            let raw_value = self.config().value_from_counts_index(index);
            total_value += count * self.config().median_equivalent(raw_value) as f64;
        }
        total_value / total_count as f64
    }

    /// The population standard deviation of recorded values, 0 if empty.
    pub fn stddev(&self) -> f64 {
        let total_count = self.total_count();
        if total_count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let mut sum_of_squares = 0_f64;
        for index in 0..self.counts_len() {
            let count = self.count_at_index(index) as f64;
            if count == 0.0 {
                continue;
            }
            let raw_value = self.config().value_from_counts_index(index);
            let deviation = self.config().median_equivalent(raw_value) as f64 - mean;
            sum_of_squares += count * deviation * deviation;
        }
        (sum_of_squares / total_count as f64).sqrt()
    }
}
