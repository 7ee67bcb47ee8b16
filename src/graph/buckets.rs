use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::bucketizer::Bucketizer;

/// Per-bucket exclusive upper bounds into a date-sorted array.
///
/// `counts[b]` is how many leading entries are dated at or before bucket
/// `b`, so revealing a playback position is a slice `[..counts[b]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucketIndex {
    counts: Vec<usize>,
    total: usize,
}

impl DateBucketIndex {
    /// Builds the index over `items`, which must already be sorted with
    /// [`sort_by_date`]. Dateless entries belong to bucket 0.
    pub fn build<T, F>(items: &[T], date_of: F, bucketizer: &dyn Bucketizer) -> Self
    where
        F: Fn(&T) -> Option<DateTime<Utc>>,
    {
        let total = items.len();
        let buckets = bucketizer.num_buckets();
        let mut counts = vec![total; buckets];
        let mut filled = vec![false; buckets];

        if buckets > 0 {
            let last = buckets as i64 - 1;
            for (index, item) in items.iter().enumerate() {
                let bucket = date_of(item)
                    .map(|date| bucketizer.bucket_index(date).clamp(0, last))
                    .unwrap_or(0) as usize;
                counts[bucket] = index + 1;
                filled[bucket] = true;
            }
        }

        // Buckets nothing falls into reveal the same as the bucket before.
        let mut previous = 0;
        for (count, filled) in counts.iter_mut().zip(filled) {
            if filled {
                previous = *count;
            } else {
                *count = previous;
            }
        }

        Self { counts, total }
    }

    pub fn num_buckets(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Re-expresses the table over a subset of the entries. `kept(n)` gives
    /// how many of the first `n` original entries survive.
    pub fn restricted<F>(&self, kept: F) -> Self
    where
        F: Fn(usize) -> usize,
    {
        Self {
            counts: self.counts.iter().map(|c| kept(*c)).collect(),
            total: kept(self.total),
        }
    }

    /// Entries revealed through `bucket`. No selection reveals everything,
    /// as does a bucket past the end.
    pub fn revealed(&self, bucket: Option<usize>) -> usize {
        match bucket {
            Some(bucket) => self.counts.get(bucket).copied().unwrap_or(self.total),
            None => self.total,
        }
    }
}

/// Ascending date order with dateless entries first. Stable.
pub fn sort_by_date<T, F>(items: &mut [T], date_of: F)
where
    F: Fn(&T) -> Option<DateTime<Utc>>,
{
    items.sort_by(|a, b| compare_dates(date_of(a), date_of(b)));
}

fn compare_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}
