//! In-memory time series storage keyed by source and measurement kind.
//!
//! Every filter returns a fresh store; appended samples are never modified.
//! Series keep the order in which samples were appended, which is the
//! recorded order. Use [`TimeSeriesStore::ordered`] where time order matters.

use chrono::{DateTime, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::parsers::{Field, Measurement, MeasurementKind};

/// Label identifying the recording (usually the file name) a sample came from
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for SourceId {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// A measurement with its parsed timestamp
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub time: NaiveDateTime,
    #[serde(flatten)]
    pub measurement: Measurement,
}

/// All samples of one kind from one source
#[derive(Clone, Debug)]
pub struct Series {
    pub source: SourceId,
    pub kind: MeasurementKind,
    pub samples: Vec<Sample>,
}

/// Parse a recorder timestamp.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]` with `T` or a space as separator.
/// Timestamps carrying `Z` or a numeric offset are converted to UTC.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Fractional seconds from `from` to `to`
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Duration from fractional seconds, microsecond resolution
pub fn duration_from_secs(seconds: f64) -> Duration {
    Duration::microseconds((seconds * 1_000_000.0).round() as i64)
}

/// Measurements organized by `(source, kind)`
#[derive(Clone, Debug, Default)]
pub struct TimeSeriesStore {
    series: Vec<Series>,
}

impl TimeSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement. Fails if its timestamp cannot be parsed.
    pub fn append(&mut self, source: impl Into<SourceId>, measurement: Measurement) -> Result<()> {
        let source = source.into();
        let time = parse_timestamp(measurement.timestamp()).ok_or_else(|| {
            Error::malformed(
                source.as_str(),
                format!("unparseable timestamp '{}'", measurement.timestamp()),
            )
        })?;
        self.push(source, Sample { time, measurement });
        Ok(())
    }

    fn push(&mut self, source: SourceId, sample: Sample) {
        let kind = sample.measurement.kind();
        match self
            .series
            .iter_mut()
            .find(|s| s.source == source && s.kind == kind)
        {
            Some(series) => series.samples.push(sample),
            None => self.series.push(Series {
                source,
                kind,
                samples: vec![sample],
            }),
        }
    }

    /// Total number of samples
    pub fn len(&self) -> usize {
        self.series.iter().map(|s| s.samples.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of samples of one kind
    pub fn count(&self, kind: MeasurementKind) -> usize {
        self.series
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.samples.len())
            .sum()
    }

    /// Sources in the order they were first appended
    pub fn sources(&self) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> = Vec::new();
        for series in &self.series {
            if !sources.contains(&series.source) {
                sources.push(series.source.clone());
            }
        }
        sources
    }

    pub fn all_series(&self) -> &[Series] {
        &self.series
    }

    /// Samples of one source and kind in recorded order
    pub fn series(&self, source: &SourceId, kind: MeasurementKind) -> &[Sample] {
        self.series
            .iter()
            .find(|s| &s.source == source && s.kind == kind)
            .map(|s| s.samples.as_slice())
            .unwrap_or(&[])
    }

    /// Samples of one source and kind sorted by time; equal times keep recorded order
    pub fn ordered(&self, source: &SourceId, kind: MeasurementKind) -> Vec<Sample> {
        let mut samples = self.series(source, kind).to_vec();
        samples.sort_by_key(|s| s.time);
        samples
    }

    fn filtered(&self, keep: impl Fn(&Series, &Sample) -> bool) -> Self {
        let series = self
            .series
            .iter()
            .filter_map(|series| {
                let samples: Vec<Sample> = series
                    .samples
                    .iter()
                    .filter(|sample| keep(series, sample))
                    .cloned()
                    .collect();
                (!samples.is_empty()).then(|| Series {
                    source: series.source.clone(),
                    kind: series.kind,
                    samples,
                })
            })
            .collect();
        Self { series }
    }

    pub fn filter_by_kind(&self, kind: MeasurementKind) -> Self {
        self.filtered(|series, _| series.kind == kind)
    }

    pub fn filter_by_source(&self, source: &SourceId) -> Self {
        self.filtered(|series, _| &series.source == source)
    }

    pub fn filter_by_sources(&self, sources: &[SourceId]) -> Self {
        self.filtered(|series, _| sources.contains(&series.source))
    }

    /// Samples with `start <= time < end`; `None` leaves the range open-ended
    pub fn filter_by_time_range(&self, start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        self.filtered(|_, s| s.time >= start && end.map_or(true, |end| s.time < end))
    }

    /// Samples with `start <= time <= end`
    pub fn filter_by_time_range_inclusive(&self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.filtered(|_, s| s.time >= start && s.time <= end)
    }

    /// Samples whose `field` equals `value`. Samples lacking the field are dropped.
    pub fn filter_by_field_equals(&self, field: Field, value: f64) -> Self {
        self.filtered(|_, s| s.measurement.field(field) == Some(value))
    }

    /// Keep only the given kinds
    pub fn filter_by_kinds(&self, kinds: &[MeasurementKind]) -> Self {
        self.filtered(|series, _| kinds.contains(&series.kind))
    }

    /// Drop samples of `kind` that are not on `frequency_khz`; other kinds are kept
    pub fn retain_frequency(&self, kind: MeasurementKind, frequency_khz: u32) -> Self {
        self.filtered(|series, s| {
            series.kind != kind || s.measurement.frequency_khz() == Some(frequency_khz)
        })
    }

    /// Carrier frequencies present for `kind` with their sample counts, ascending
    pub fn frequency_counts(&self, kind: MeasurementKind) -> Vec<(u32, usize)> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for series in self.series.iter().filter(|s| s.kind == kind) {
            for sample in &series.samples {
                if let Some(freq) = sample.measurement.frequency_khz() {
                    *counts.entry(freq).or_default() += 1;
                }
            }
        }
        counts.into_iter().collect()
    }
}
