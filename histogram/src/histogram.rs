// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The histogram core (component C): a generic `Histogram<C>` over any
//! [`Counts`] storage policy, plus the coordinated-omission corrector
//! (component E).

use crate::config::Config;
use crate::counts::Counts;
use crate::Error;

/// A high dynamic range histogram: records non-negative integer values into
/// a bucketed counts array with a bounded relative error, and answers
/// percentile/mean/stddev queries over the recorded distribution.
///
/// Generic over the counts-storage policy `C`; see [`crate::counts`] for the
/// available policies. All operations take `&self` -- interior mutability is
/// pushed down into `C` so that callers don't need to reason about
/// `Mutex`/`RefCell` at the `Histogram` level.
pub struct Histogram<C: Counts> {
    config: Config,
    counts: C,
}

impl<C: Counts> Histogram<C> {
    /// Builds a histogram directly; prefer [`Builder`] when constructing
    /// from configuration rather than literals.
    pub fn new(
        lowest_discernible_value: u64,
        highest_trackable_value: u64,
        significant_value_digits: u8,
    ) -> Result<Self, Error> {
        let config = Config::new(
            lowest_discernible_value,
            highest_trackable_value,
            significant_value_digits,
        )?;
        Ok(Self {
            counts: C::with_len(config.counts_length()),
            config,
        })
    }

    pub(crate) fn from_config(config: Config) -> Self {
        Self {
            counts: C::with_len(config.counts_length()),
            config,
        }
    }

    /// The bucket-math layout backing this histogram.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Records a single observation of `value`.
    pub fn record(&self, value: u64) -> Result<(), Error> {
        let index = self.config.index_for(value)?;
        self.counts.add_count_at(index, 1)?;
        self.counts.track_value(value as i64);
        Ok(())
    }

    /// Records `count` observations of `value`.
    pub fn record_n(&self, value: u64, count: u64) -> Result<(), Error> {
        let index = self.config.index_for(value)?;
        self.counts.add_count_at(index, count as i64)?;
        self.counts.track_value(value as i64);
        Ok(())
    }

    /// Records `value`, backfilling synthetic samples to correct for
    /// coordinated omission (component E, §4.4): if a blocked sampler would
    /// have observed intermediate events at `expected_interval` spacing,
    /// this replays them so the tail doesn't get underreported.
    ///
    /// The original value is recorded first; synthetic values follow in
    /// decreasing order down to and including `expected_interval` itself.
    /// The total number of records added is `floor(value / expected_interval)`.
    /// A no-op correction (`expected_interval == 0`) is just `record`.
    pub fn record_corrected(&self, value: u64, expected_interval: u64) -> Result<(), Error> {
        self.record(value)?;
        if expected_interval == 0 || value < expected_interval {
            return Ok(());
        }
        let mut synthetic = value - expected_interval;
        while synthetic >= expected_interval {
            self.record(synthetic)?;
            synthetic -= expected_interval;
        }
        Ok(())
    }

    /// Zeroes every counter and resets the running aggregates.
    pub fn reset(&self) {
        self.counts.clear();
    }

    /// Recomputes `total_count` from the individual counters. Needed after
    /// an [`Error::OverflowedSmallWidth`] from a narrow-width plain policy.
    pub fn reestablish_total_count(&self) {
        self.counts.reestablish_total_count();
    }

    /// The number of observations recorded.
    pub fn total_count(&self) -> u64 {
        self.counts.total_count()
    }

    /// The smallest recorded value, or `None` if the histogram is empty.
    pub fn min(&self) -> Option<u64> {
        if self.counts.total_count() == 0 {
            None
        } else {
            Some(self.counts.min_value() as u64)
        }
    }

    /// The largest recorded value, or `None` if the histogram is empty.
    pub fn max(&self) -> Option<u64> {
        if self.counts.total_count() == 0 {
            None
        } else {
            Some(self.counts.max_value() as u64)
        }
    }

    /// The count recorded for the equivalent-value range containing `value`.
    pub fn count_at_value(&self, value: u64) -> Result<u64, Error> {
        let index = self.config.index_for(value)?;
        Ok(self.counts.count_at(index) as u64)
    }

    /// The count stored at a given counts-array index. Exposed for
    /// iteration (component D) and wire encoding (component H), which both
    /// need to walk the raw slots rather than go through `record`.
    pub fn count_at_index(&self, index: usize) -> i64 {
        self.counts.count_at(index)
    }

    /// Number of counts-array slots backing this histogram.
    pub fn counts_len(&self) -> usize {
        self.counts.len()
    }

    /// Unconditionally overwrites the count at `index`, bypassing
    /// `record`'s value-to-index mapping and min/max tracking. Used by the
    /// wire decoder, which reconstructs absolute per-index counts directly;
    /// callers must follow up with [`Histogram::recompute_aggregates`] once
    /// every index has been set.
    pub fn set_count_at_index(&self, index: usize, count: i64) {
        self.counts.set_count_at(index, count);
    }

    /// Recomputes `total_count`, `min_value`, and `max_value` purely from
    /// the populated counts-array slots. Used after [`Histogram::set_count_at_index`]
    /// has repopulated the array directly (the wire decoder's step 5).
    pub fn recompute_aggregates(&self) {
        self.counts.reestablish_total_count();
        let mut bounds: Option<(u64, u64)> = None;
        for index in 0..self.counts_len() {
            if self.count_at_index(index) <= 0 {
                continue;
            }
            let raw_value = self.config.value_from_counts_index(index);
            let lo = self.config.lowest_equivalent(raw_value);
            let hi = self.config.highest_equivalent(raw_value);
            bounds = Some(match bounds {
                None => (lo, hi),
                Some((min, max)) => (min.min(lo), max.max(hi)),
            });
        }
        if let Some((min, max)) = bounds {
            // `track_value(max)` first so that the sentinel-to-max jump
            // doesn't get clobbered by the subsequent min update; see
            // `Counts::track_value`'s independent min/max comparisons.
            self.counts.track_value(max as i64);
            self.counts.track_value(min as i64);
        }
    }

    /// Merges `other`'s recorded values into `self`, via each value's
    /// [`Config::median_equivalent`] so histograms with compatible but
    /// distinct bucketing parameters can still be combined.
    pub fn add<OC: Counts>(&self, other: &Histogram<OC>) -> Result<(), Error> {
        self.merge(other, None)
    }

    /// Like [`Histogram::add`], but each of `other`'s recorded values is
    /// replayed through [`Histogram::record_corrected`] on the receiver.
    pub fn add_while_correcting_for_coordinated_omission<OC: Counts>(
        &self,
        other: &Histogram<OC>,
        expected_interval: u64,
    ) -> Result<(), Error> {
        self.merge(other, Some(expected_interval))
    }

    fn merge<OC: Counts>(
        &self,
        other: &Histogram<OC>,
        expected_interval: Option<u64>,
    ) -> Result<(), Error> {
        for index in 0..other.counts_len() {
            let count = other.count_at_index(index);
            if count == 0 {
                continue;
            }
            let value = other.config.median_equivalent(other.config.value_from_counts_index(index));
            match expected_interval {
                Some(interval) if interval > 0 => {
                    for _ in 0..count {
                        self.record_corrected(value, interval)?;
                    }
                }
                _ => self.record_n(value, count as u64)?,
            }
        }
        Ok(())
    }

    /// Subtracts `other`'s recorded values from `self`; the inverse of
    /// [`Histogram::add`]. Fails without applying any change if any
    /// resulting count would go negative.
    pub fn subtract<OC: Counts>(&self, other: &Histogram<OC>) -> Result<(), Error> {
        for index in 0..other.counts_len() {
            let count = other.count_at_index(index);
            if count == 0 {
                continue;
            }
            let value = other.config.median_equivalent(other.config.value_from_counts_index(index));
            let my_index = self.config.index_for(value)?;
            self.counts.sub_count_at(my_index, count)?;
        }
        Ok(())
    }

    /// A deep copy sharing no storage with `self`.
    pub fn copy(&self) -> Self {
        let copy = Self::from_config(self.config);
        for index in 0..self.counts_len() {
            let count = self.count_at_index(index);
            if count != 0 {
                copy.counts.set_count_at(index, count);
            }
        }
        copy.counts.set_total_count(self.counts.total_count());
        copy.counts.track_value(self.counts.min_value());
        copy.counts.track_value(self.counts.max_value());
        copy
    }

    /// Deep-copies `self` into `target`. Requires compatible bucketing
    /// parameters.
    pub fn copy_into(&self, target: &Self) -> Result<(), Error> {
        if !self.config.is_compatible_with(&target.config) {
            return Err(Error::IncompatibleHistograms);
        }
        target.reset();
        for index in 0..self.counts_len() {
            let count = self.count_at_index(index);
            if count != 0 {
                target.counts.set_count_at(index, count);
            }
        }
        target.counts.set_total_count(self.counts.total_count());
        target.counts.track_value(self.counts.min_value());
        target.counts.track_value(self.counts.max_value());
        Ok(())
    }
}

/// Builds a [`Histogram`] from named configuration rather than positional
/// literals, matching the construction surface the rest of this workspace's
/// components expect (e.g. the `recorder` crate's interval recorder, which
/// needs to build matching active/inactive histograms from one set of
/// parameters).
pub struct Builder {
    lowest_discernible_value: u64,
    highest_trackable_value: u64,
    significant_value_digits: u8,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            lowest_discernible_value: 1,
            highest_trackable_value: 3_600_000_000,
            significant_value_digits: 3,
        }
    }
}

impl Builder {
    /// A builder seeded with HdrHistogram's conventional defaults (1 hour in
    /// microseconds at 3 significant digits).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lowest value that can be discerned (distinguished from 0).
    pub fn lowest_discernible_value(mut self, value: u64) -> Self {
        self.lowest_discernible_value = value;
        self
    }

    /// Sets the highest value trackable without saturating.
    pub fn highest_trackable_value(mut self, value: u64) -> Self {
        self.highest_trackable_value = value;
        self
    }

    /// Sets the number of significant decimal digits of precision.
    pub fn significant_value_digits(mut self, digits: u8) -> Self {
        self.significant_value_digits = digits;
        self
    }

    /// Builds the histogram, validating the accumulated parameters.
    pub fn build<C: Counts>(self) -> Result<Histogram<C>, Error> {
        Histogram::new(
            self.lowest_discernible_value,
            self.highest_trackable_value,
            self.significant_value_digits,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::{AtomicCounts, PlainCounts64};

    #[test]
    fn record_and_query() {
        let h: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        h.record(100).unwrap();
        h.record(200).unwrap();
        assert_eq!(h.total_count(), 2);
        assert_eq!(h.min(), Some(100));
        assert_eq!(h.max(), Some(200));
    }

    #[test]
    fn record_corrected_backfills_synthetic_samples() {
        let h: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        h.record_corrected(207, 100).unwrap();
        // 207 itself, then 107, then stop (7 <= 100).
        assert_eq!(h.total_count(), 2);
    }

    #[test]
    fn add_merges_across_counts_policies() {
        let a: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        let b: Histogram<AtomicCounts> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        b.record(1_000).unwrap();
        b.record(1_000).unwrap();
        a.add(&b).unwrap();
        assert_eq!(a.total_count(), 2);
    }

    #[test]
    fn subtract_is_inverse_of_add() {
        let a: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        let b: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        a.record(500).unwrap();
        a.record(500).unwrap();
        b.record(500).unwrap();
        a.subtract(&b).unwrap();
        assert_eq!(a.total_count(), 1);
    }

    #[test]
    fn copy_into_requires_compatible_config() {
        let a: Histogram<PlainCounts64> = Histogram::new(1, 3_600_000_000, 3).unwrap();
        let b: Histogram<PlainCounts64> = Histogram::new(1, 1_000, 2).unwrap();
        assert_eq!(a.copy_into(&b), Err(Error::IncompatibleHistograms));
    }

    #[test]
    fn builder_applies_parameters() {
        let h: Histogram<PlainCounts64> = Builder::new()
            .lowest_discernible_value(1)
            .highest_trackable_value(1_000)
            .significant_value_digits(2)
            .build()
            .unwrap();
        assert_eq!(h.config().highest_trackable_value(), 1_000);
    }
}
