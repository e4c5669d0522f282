//! Per-trip chart series.
//!
//! Turns a trip's records into `(time_rel, value)` points for one metric,
//! optionally averaged into fixed wall-clock buckets.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumString};

use super::trips::Trip;
use crate::parsers::Metric;
use crate::store::SourceId;

/// Resampling interval for chart series
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumString,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Resample {
    #[strum(serialize = "original")]
    #[serde(rename = "original")]
    Original,
    #[strum(serialize = "1s")]
    #[serde(rename = "1s")]
    OneSecond,
    #[default]
    #[strum(serialize = "5s")]
    #[serde(rename = "5s")]
    FiveSeconds,
    #[strum(serialize = "10s")]
    #[serde(rename = "10s")]
    TenSeconds,
}

impl Resample {
    /// Bucket width in seconds, `None` for the original samples
    pub fn seconds(&self) -> Option<i64> {
        match self {
            Resample::Original => None,
            Resample::OneSecond => Some(1),
            Resample::FiveSeconds => Some(5),
            Resample::TenSeconds => Some(10),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Sample time, or bucket start when resampled
    pub time: NaiveDateTime,
    pub time_rel: f64,
    pub value: f64,
}

/// One trip's metric over relative time
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripSeries {
    pub source: SourceId,
    pub metric: Metric,
    pub resample: Resample,
    pub points: Vec<SeriesPoint>,
    /// Mean of the plotted points, `None` when there are none
    pub mean: Option<f64>,
}

/// Build the chart series of `metric` for one trip
pub fn trip_series(trip: &Trip, metric: Metric, resample: Resample) -> TripSeries {
    let raw: Vec<SeriesPoint> = trip
        .records
        .iter()
        .filter_map(|record| {
            let value = record.sample.measurement.metric(metric)?;
            Some(SeriesPoint {
                time: record.sample.time,
                time_rel: record.time_rel,
                value,
            })
        })
        .collect();

    let points = match resample.seconds() {
        None => raw,
        Some(width) => bucket_means(&raw, width),
    };

    let mean = (!points.is_empty())
        .then(|| points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64);

    TripSeries {
        source: trip.source.clone(),
        metric,
        resample,
        points,
        mean,
    }
}

/// Mean of value and relative time per epoch-aligned bucket; empty buckets are dropped
fn bucket_means(points: &[SeriesPoint], width: i64) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<i64, (f64, f64, usize)> = BTreeMap::new();
    for point in points {
        let key = point.time.and_utc().timestamp().div_euclid(width);
        let entry = buckets.entry(key).or_insert((0.0, 0.0, 0));
        entry.0 += point.value;
        entry.1 += point.time_rel;
        entry.2 += 1;
    }

    buckets
        .into_iter()
        .filter_map(|(key, (value_sum, rel_sum, count))| {
            let start = DateTime::from_timestamp(key * width, 0)?.naive_utc();
            Some(SeriesPoint {
                time: start,
                time_rel: rel_sum / count as f64,
                value: value_sum / count as f64,
            })
        })
        .collect()
}
