use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date-binning strategy used to index nodes and links for playback.
pub trait Bucketizer {
    fn start_date(&self) -> DateTime<Utc>;

    fn end_date(&self) -> DateTime<Utc>;

    /// Bucket holding `date`. May fall outside `0..num_buckets()` for dates
    /// beyond the configured range.
    fn bucket_index(&self, date: DateTime<Utc>) -> i64;

    fn num_buckets(&self) -> usize;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Month,
    Year,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Month => write!(f, "month"),
            Granularity::Year => write!(f, "year"),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            other => Err(format!("unknown granularity '{}'", other)),
        }
    }
}

impl Granularity {
    fn coarser(self) -> Option<Granularity> {
        match self {
            Granularity::Day => Some(Granularity::Month),
            Granularity::Month => Some(Granularity::Year),
            Granularity::Year => None,
        }
    }
}

/// Upper bound on the bucket count of a fitted timeline.
pub const MAX_FITTED_BUCKETS: usize = 10_000;

/// Calendar bucketizer with day, month or year sized buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucketizer {
    granularity: Granularity,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateBucketizer {
    pub fn new(granularity: Granularity, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            granularity,
            start: zero_out_date(granularity, start),
            end,
        }
    }

    /// Fits a bucketizer to the earliest and latest of `dates`.
    ///
    /// A span needing more than [`MAX_FITTED_BUCKETS`] buckets is retried at
    /// the next coarser granularity. `None` when there are no dates or even
    /// yearly buckets exceed the limit.
    pub fn spanning<I>(granularity: Granularity, dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut range: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for date in dates {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
                None => (date, date),
            });
        }
        let (start, end) = range?;

        let mut granularity = granularity;
        loop {
            let fitted = Self::new(granularity, start, end);
            if fitted.num_buckets() <= MAX_FITTED_BUCKETS {
                return Some(fitted);
            }
            match granularity.coarser() {
                Some(next) => {
                    tracing::warn!(
                        from = %granularity,
                        to = %next,
                        buckets = fitted.num_buckets(),
                        "date span too wide, widening timeline buckets"
                    );
                    granularity = next;
                }
                None => {
                    tracing::warn!(
                        %start,
                        %end,
                        "date span too wide for a timeline, skipping date buckets"
                    );
                    return None;
                }
            }
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// First moment of bucket `index`.
    pub fn date_for_bucket(&self, index: usize) -> DateTime<Utc> {
        let offset = index as i64;
        match self.granularity {
            Granularity::Day => self.start + Duration::days(offset),
            Granularity::Month => {
                let months = self.start.year() as i64 * 12 + self.start.month0() as i64 + offset;
                month_start(months)
            }
            Granularity::Year => month_start((self.start.year() as i64 + offset) * 12),
        }
    }
}

impl Bucketizer for DateBucketizer {
    fn start_date(&self) -> DateTime<Utc> {
        self.start
    }

    fn end_date(&self) -> DateTime<Utc> {
        self.end
    }

    fn bucket_index(&self, date: DateTime<Utc>) -> i64 {
        match self.granularity {
            Granularity::Day => {
                (zero_out_date(Granularity::Day, date) - self.start).num_days()
            }
            Granularity::Month => {
                let months = |d: DateTime<Utc>| d.year() as i64 * 12 + d.month0() as i64;
                months(date) - months(self.start)
            }
            Granularity::Year => date.year() as i64 - self.start.year() as i64,
        }
    }

    fn num_buckets(&self) -> usize {
        let last = self.bucket_index(self.end);
        if last < 0 { 0 } else { last as usize + 1 }
    }
}

/// Truncates `date` to the start of its day, month or year.
pub fn zero_out_date(granularity: Granularity, date: DateTime<Utc>) -> DateTime<Utc> {
    let day = match granularity {
        Granularity::Day => date.date_naive(),
        Granularity::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
            .unwrap_or_else(|| date.date_naive()),
        Granularity::Year => {
            NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or_else(|| date.date_naive())
        }
    };
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}

fn month_start(months: i64) -> DateTime<Utc> {
    let year = months.div_euclid(12) as i32;
    let month = months.rem_euclid(12) as u32 + 1;
    let day = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}
