//! Time-of-day histograms per category.
//!
//! Bucket `h` (1..=23) counts times strictly between `(h-1):30` and `h:30`.
//! Anything else, including the exact half-hour boundaries and the span
//! from 23:30 through 00:30, lands in the overnight bucket 25. Bucket 24 is
//! kept so every histogram has the same 25 slots; it is never filled.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{AdEnvelopeRecord, Category};

pub const TIME_BUCKETS: usize = 25;
pub const OVERNIGHT_BUCKET: usize = 25;
const PRIMARY_BUCKETS: u32 = 23;

fn half_past(hour: u32) -> u32 {
    hour * 3600 + 30 * 60
}

/// Bucket id (1..=25) for a time of day.
pub fn bucket_for(time: NaiveTime) -> usize {
    let secs = time.num_seconds_from_midnight();
    let after = |bound: u32| secs > bound || (secs == bound && time.nanosecond() > 0);

    (1..=PRIMARY_BUCKETS)
        .find(|&h| after(half_past(h - 1)) && secs < half_past(h))
        .map(|h| h as usize)
        .unwrap_or(OVERNIGHT_BUCKET)
}

/// Human-readable span of a bucket, e.g. `"10:30~11:30"`.
pub fn bucket_label(bucket: usize) -> String {
    if bucket == OVERNIGHT_BUCKET {
        "23:30~00:30".to_string()
    } else {
        format!("{:02}:30~{:02}:30", bucket.saturating_sub(1), bucket)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: usize,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeHistogram {
    counts: [u32; TIME_BUCKETS],
}

impl TimeHistogram {
    pub fn add(&mut self, time: NaiveTime) {
        self.counts[bucket_for(time) - 1] += 1;
    }

    pub fn count(&self, bucket: usize) -> u32 {
        bucket
            .checked_sub(1)
            .and_then(|i| self.counts.get(i))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// All 25 buckets in id order.
    pub fn entries(&self) -> Vec<BucketCount> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &count)| BucketCount { bucket: i + 1, count })
            .collect()
    }

    /// Non-empty primary buckets, busiest first, ties by bucket id.
    pub fn busiest(&self, n: usize) -> Vec<BucketCount> {
        let mut ranked: Vec<BucketCount> = self
            .entries()
            .into_iter()
            .filter(|b| b.bucket != OVERNIGHT_BUCKET && b.count > 0)
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.bucket.cmp(&b.bucket)));
        ranked.truncate(n);
        ranked
    }
}

/// Histograms for every named category that has at least one record.
#[derive(Debug, Clone, Default)]
pub struct CategoryTimeHistogram {
    histograms: BTreeMap<Category, TimeHistogram>,
}

impl CategoryTimeHistogram {
    pub fn build(records: &[AdEnvelopeRecord]) -> Self {
        let mut histograms: BTreeMap<Category, TimeHistogram> = BTreeMap::new();
        for record in records {
            let category = record.category();
            if Category::NAMED.contains(&category) {
                histograms.entry(category).or_default().add(record.time);
            }
        }
        Self { histograms }
    }

    pub fn get(&self, category: Category) -> Option<&TimeHistogram> {
        self.histograms.get(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &TimeHistogram)> {
        self.histograms.iter().map(|(c, h)| (*c, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn bins_times_with_strict_boundaries() {
        assert_eq!(bucket_for(hm(11, 29)), 11);
        assert_eq!(bucket_for(hm(11, 31)), 12);
        assert_eq!(bucket_for(hm(0, 31)), 1);
        assert_eq!(bucket_for(hm(23, 29)), 23);
        assert_eq!(bucket_for(hm(11, 0)), 11);
        assert_eq!(bucket_for(hm(17, 45)), 18);
    }

    #[test]
    fn overnight_and_boundaries_fall_into_bucket_25() {
        assert_eq!(bucket_for(hm(23, 31)), OVERNIGHT_BUCKET);
        assert_eq!(bucket_for(hm(0, 29)), OVERNIGHT_BUCKET);
        assert_eq!(bucket_for(hm(0, 0)), OVERNIGHT_BUCKET);
        assert_eq!(bucket_for(hm(12, 30)), OVERNIGHT_BUCKET);
        assert_eq!(bucket_for(hm(23, 30)), OVERNIGHT_BUCKET);
    }

    #[test]
    fn sub_second_past_boundary_moves_to_next_bucket() {
        let time = NaiveTime::from_hms_milli_opt(12, 30, 0, 500).unwrap();
        assert_eq!(bucket_for(time), 13);
    }

    #[test]
    fn histogram_total_matches_records_added() {
        let mut histogram = TimeHistogram::default();
        for (h, m) in [(11, 29), (11, 31), (12, 30), (23, 59), (6, 0)] {
            histogram.add(hm(h, m));
        }
        assert_eq!(histogram.total(), 5);
        assert_eq!(histogram.count(11), 1);
        assert_eq!(histogram.count(12), 1);
        assert_eq!(histogram.count(6), 1);
        assert_eq!(histogram.count(OVERNIGHT_BUCKET), 2);
        assert_eq!(histogram.count(24), 0);
        assert_eq!(histogram.count(0), 0);
        assert_eq!(histogram.entries().len(), TIME_BUCKETS);
    }

    #[test]
    fn busiest_ranks_by_count_and_skips_overnight() {
        let mut histogram = TimeHistogram::default();
        for (h, m) in [(17, 0), (17, 10), (11, 0), (13, 0), (0, 0), (0, 5), (0, 10)] {
            histogram.add(hm(h, m));
        }
        let busiest: Vec<usize> = histogram.busiest(2).iter().map(|b| b.bucket).collect();
        assert_eq!(busiest, vec![17, 11]);
    }

    #[test]
    fn labels_cover_half_hour_spans() {
        assert_eq!(bucket_label(11), "10:30~11:30");
        assert_eq!(bucket_label(1), "00:30~01:30");
        assert_eq!(bucket_label(OVERNIGHT_BUCKET), "23:30~00:30");
    }

    #[test]
    fn groups_histograms_by_category() {
        let records: Vec<AdEnvelopeRecord> = [
            ("waimai.meituan.com", hm(11, 0)),
            ("waimai.meituan.com", hm(17, 40)),
            ("gsactivity.xiaojukeji.com", hm(19, 0)),
            ("unknownapp.xyz", hm(9, 0)),
        ]
        .into_iter()
        .map(|(domain, time)| {
            let record = AdEnvelopeRecord::new(time, Vec::new(), domain);
            record.classify();
            record
        })
        .collect();

        let histograms = CategoryTimeHistogram::build(&records);
        assert_eq!(histograms.get(Category::Takeout).unwrap().total(), 2);
        assert_eq!(histograms.get(Category::Taxi).unwrap().count(19), 1);
        assert!(histograms.get(Category::Unknown).is_none());
        assert_eq!(histograms.iter().count(), 2);
    }
}
