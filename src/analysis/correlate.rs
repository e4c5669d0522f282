//! Radio-to-GNSS correlation.
//!
//! Attaches aggregated radio metrics to every GNSS fix of the same source.
//! An interval without radio samples yields `None`, never zero.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::parsers::{GnssFix, MeasurementKind, Metric, Technology};
use crate::store::{duration_from_secs, Sample, SourceId, TimeSeriesStore};

/// Default half-width of the symmetric window
pub const DEFAULT_WINDOW_SECONDS: f64 = 1.0;

/// How radio samples are assigned to fixes
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
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrategy {
    /// Mean of samples within `[t - w, t + w]` around each fix
    Window,
    /// Mean of samples in `(previous fix, this fix]`; the first fix gets nothing
    #[default]
    Bucket,
}

/// A GNSS fix annotated with the radio metrics aggregated onto it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorrelatedFix {
    pub source: SourceId,
    pub time: NaiveDateTime,
    #[serde(flatten)]
    pub fix: GnssFix,
    /// Mean level/field strength, `None` when no sample contributed
    pub level: Option<f64>,
    /// Mean SNR, `None` when no sample contributed
    pub snr: Option<f64>,
    /// Number of radio samples aggregated
    pub sample_count: usize,
}

impl CorrelatedFix {
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Level => self.level,
            Metric::Snr => self.snr,
        }
    }
}

#[derive(Default)]
struct Accumulator {
    level_sum: f64,
    level_count: usize,
    snr_sum: f64,
    snr_count: usize,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, sample: &Sample) {
        self.count += 1;
        if let Some(level) = sample.measurement.level() {
            self.level_sum += level;
            self.level_count += 1;
        }
        if let Some(snr) = sample.measurement.snr() {
            self.snr_sum += snr;
            self.snr_count += 1;
        }
    }

    fn from_samples(samples: &[Sample]) -> Self {
        let mut acc = Self::default();
        samples.iter().for_each(|s| acc.add(s));
        acc
    }

    fn mean(sum: f64, count: usize) -> Option<f64> {
        (count > 0).then(|| sum / count as f64)
    }

    fn into_fix(self, source: &SourceId, time: NaiveDateTime, fix: &GnssFix) -> CorrelatedFix {
        CorrelatedFix {
            source: source.clone(),
            time,
            fix: fix.clone(),
            level: Self::mean(self.level_sum, self.level_count),
            snr: Self::mean(self.snr_sum, self.snr_count),
            sample_count: self.count,
        }
    }
}

/// Joins radio samples to GNSS fixes
#[derive(Clone, Copy, Debug)]
pub struct IntervalCorrelator {
    technology: Technology,
    strategy: CorrelationStrategy,
    window: Duration,
}

impl IntervalCorrelator {
    pub fn new(technology: Technology, strategy: CorrelationStrategy) -> Self {
        Self {
            technology,
            strategy,
            window: duration_from_secs(DEFAULT_WINDOW_SECONDS),
        }
    }

    /// Set the half-width used by the window strategy
    pub fn with_window_seconds(mut self, seconds: f64) -> Self {
        self.window = duration_from_secs(seconds.abs());
        self
    }

    pub fn strategy(&self) -> CorrelationStrategy {
        self.strategy
    }

    /// Correlate every listed source. Output is grouped by source in the
    /// given order, fixes sorted by time within each source.
    pub fn correlate(&self, store: &TimeSeriesStore, sources: &[SourceId]) -> Vec<CorrelatedFix> {
        let radio_kind = self.technology.kind();
        sources
            .iter()
            .flat_map(|source| {
                let fixes = store.ordered(source, MeasurementKind::Gnss);
                let radio = store.ordered(source, radio_kind);
                self.correlate_source(source, &fixes, &radio)
            })
            .collect()
    }

    /// Correlate one source. Both slices must be sorted by time.
    pub fn correlate_source(
        &self,
        source: &SourceId,
        fixes: &[Sample],
        radio: &[Sample],
    ) -> Vec<CorrelatedFix> {
        match self.strategy {
            CorrelationStrategy::Bucket => bucket(source, fixes, radio),
            CorrelationStrategy::Window => window(source, fixes, radio, self.window),
        }
    }
}

fn bucket(source: &SourceId, fixes: &[Sample], radio: &[Sample]) -> Vec<CorrelatedFix> {
    let mut out = Vec::with_capacity(fixes.len());
    let mut previous: Option<NaiveDateTime> = None;
    let mut next = 0;

    for sample in fixes {
        let Some(fix) = sample.measurement.as_gnss() else {
            continue;
        };

        let acc = match previous {
            None => {
                // Nothing before the first fix is ever aggregated
                next = radio.partition_point(|r| r.time <= sample.time);
                Accumulator::default()
            }
            Some(_) => {
                let end = next + radio[next..].partition_point(|r| r.time <= sample.time);
                let acc = Accumulator::from_samples(&radio[next..end]);
                next = end;
                acc
            }
        };

        out.push(acc.into_fix(source, sample.time, fix));
        previous = Some(sample.time);
    }
    out
}

fn window(
    source: &SourceId,
    fixes: &[Sample],
    radio: &[Sample],
    half_width: Duration,
) -> Vec<CorrelatedFix> {
    fixes
        .iter()
        .filter_map(|sample| {
            let fix = sample.measurement.as_gnss()?;
            // A window reaching past the representable range spans the whole slice
            let lo = sample
                .time
                .checked_sub_signed(half_width)
                .map_or(0, |from| radio.partition_point(|r| r.time < from));
            let hi = sample
                .time
                .checked_add_signed(half_width)
                .map_or(radio.len(), |to| radio.partition_point(|r| r.time <= to));
            let acc = Accumulator::from_samples(&radio[lo..hi.max(lo)]);
            Some(acc.into_fix(source, sample.time, fix))
        })
        .collect()
}
