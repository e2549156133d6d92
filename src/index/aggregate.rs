//! Aggregates over range-query results.
//!
//! - [`Aggregation`] - total, average and extremes of a set of readings
//! - [`RangeSummary`] - the readings of a range together with their aggregation
//! - [`bucket_averages`] - per-hour or per-day averages

use std::collections::BTreeMap;

use crate::common::{SensorRecord, Timestamp};

/// Statistical summary of a set of readings.
///
/// The empty summary has `total` and `average` at zero and no extremes.
/// When several readings share the extreme value, the first one in scan
/// order supplies `min_time` / `max_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Number of readings aggregated.
    pub count: usize,
    /// Sum of all values.
    pub total: f64,
    pub average: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Timestamp of the reading that supplied `min`.
    pub min_time: Option<Timestamp>,
    /// Timestamp of the reading that supplied `max`.
    pub max_time: Option<Timestamp>,
}

impl Aggregation {
    /// The summary of no readings.
    pub fn empty() -> Self {
        Self {
            count: 0,
            total: 0.0,
            average: 0.0,
            min: None,
            max: None,
            min_time: None,
            max_time: None,
        }
    }

    /// Summarize `records` in one linear pass.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SensorRecord>,
    {
        let mut count = 0usize;
        let mut total = 0.0;
        let mut min: Option<&SensorRecord> = None;
        let mut max: Option<&SensorRecord> = None;

        for record in records {
            count += 1;
            total += record.value;
            // Strict comparisons: the first extreme seen wins a tie.
            if min.map_or(true, |m| record.value < m.value) {
                min = Some(record);
            }
            if max.map_or(true, |m| record.value > m.value) {
                max = Some(record);
            }
        }

        if count == 0 {
            return Self::empty();
        }

        #[allow(clippy::cast_precision_loss)]
        let average = total / count as f64;

        Self {
            count,
            total,
            average,
            min: min.map(|r| r.value),
            max: max.map(|r| r.value),
            min_time: min.map(|r| r.timestamp.clone()),
            max_time: max.map(|r| r.timestamp.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for Aggregation {
    fn default() -> Self {
        Self::empty()
    }
}

/// The readings of a range query and their [`Aggregation`].
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSummary<'a> {
    /// Matching readings in timestamp order.
    pub data: Vec<&'a SensorRecord>,
    pub aggregation: Aggregation,
}

impl<'a> RangeSummary<'a> {
    /// Aggregate `data`, keeping it alongside the result.
    pub fn new(data: Vec<&'a SensorRecord>) -> Self {
        let aggregation = Aggregation::from_records(data.iter().copied());
        Self { data, aggregation }
    }
}

/// Width of the buckets used by [`bucket_averages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// `YYYY-MM-DD HH:00:00`
    Hour,
    /// `YYYY-MM-DD`
    Day,
}

impl Granularity {
    /// The bucket `timestamp` falls in.
    pub fn bucket(self, timestamp: &Timestamp) -> String {
        match self {
            Granularity::Hour => timestamp.hour_bucket(),
            Granularity::Day => timestamp.day_bucket(),
        }
    }
}

/// Average of the readings falling in one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketAverage {
    pub bucket: String,
    pub average: f64,
    pub count: usize,
}

/// Group readings by hour or day and average each group.
///
/// Buckets come back in ascending order. Buckets with no readings are
/// absent rather than zero.
pub fn bucket_averages<'a, I>(records: I, granularity: Granularity) -> Vec<BucketAverage>
where
    I: IntoIterator<Item = &'a SensorRecord>,
{
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let slot = sums
            .entry(granularity.bucket(&record.timestamp))
            .or_insert((0.0, 0));
        slot.0 += record.value;
        slot.1 += 1;
    }

    sums.into_iter()
        .map(|(bucket, (sum, count))| {
            #[allow(clippy::cast_precision_loss)]
            let average = sum / count as f64;
            BucketAverage {
                bucket,
                average,
                count,
            }
        })
        .collect()
}
