//! One full analysis pass from typed records to a report.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::correlate::{CorrelatedFix, IntervalCorrelator};
use super::quality::{QualityScorer, Score};
use super::series::{trip_series, TripSeries};
use super::trips::{ReferencePoint, Trip, TripSegmenter};
use super::{timed_analyze, AnalysisMetadata};
use crate::error::{Error, Result};
use crate::parsers::{MeasurementKind, Technology};
use crate::settings::AnalysisSettings;
use crate::store::{SourceId, TimeSeriesStore};

/// A carrier frequency present in the data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrequencyOption {
    pub frequency_khz: u32,
    pub samples: usize,
}

/// Trip bounds without its records
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripSummary {
    pub source: SourceId,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub anchor: Option<NaiveDateTime>,
    pub records: usize,
    pub excluded: usize,
}

impl From<&Trip> for TripSummary {
    fn from(trip: &Trip) -> Self {
        Self {
            source: trip.source.clone(),
            start: trip.start,
            end: trip.end,
            anchor: trip.anchor,
            records: trip.records.len(),
            excluded: trip.excluded,
        }
    }
}

/// A correlated fix with its quality score, ready for a map layer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredFix {
    #[serde(flatten)]
    pub fix: CorrelatedFix,
    pub score: Score,
}

/// Output of one analysis pass
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    pub technology: Technology,
    /// Frequencies available before selection, ascending
    pub frequencies: Vec<FrequencyOption>,
    /// Frequency the pass was restricted to, if any
    pub frequency_khz: Option<u32>,
    pub reference: Option<ReferencePoint>,
    pub trips: Vec<TripSummary>,
    pub series: Vec<TripSeries>,
    pub fixes: Vec<ScoredFix>,
    pub metadata: AnalysisMetadata,
}

/// Run segmentation, correlation and scoring over `store`
pub fn run(store: &TimeSeriesStore, settings: &AnalysisSettings) -> Result<AnalysisReport> {
    let (report, elapsed) = timed_analyze(|| run_stages(store, settings));
    let mut report = report?;
    report.metadata.computation_time_ms = elapsed;
    Ok(report)
}

fn run_stages(store: &TimeSeriesStore, settings: &AnalysisSettings) -> Result<AnalysisReport> {
    settings.validate()?;

    let technology = settings.technology;
    let radio_kind = technology.kind();
    let mut warnings = Vec::new();

    let mut working = store.filter_by_kinds(&[radio_kind, MeasurementKind::Gnss]);
    if !settings.sources.is_empty() {
        let wanted: Vec<SourceId> = settings.sources.iter().map(SourceId::new).collect();
        let loaded = working.sources();
        for source in wanted.iter().filter(|s| !loaded.contains(s)) {
            let message = format!("Source '{}' is not loaded", source);
            tracing::warn!("{}", message);
            warnings.push(message);
        }
        working = working.filter_by_sources(&wanted);
    }

    let frequencies: Vec<FrequencyOption> = working
        .frequency_counts(radio_kind)
        .into_iter()
        .map(|(frequency_khz, samples)| FrequencyOption {
            frequency_khz,
            samples,
        })
        .collect();

    let frequency_khz = select_frequency(settings.frequency_khz, &frequencies, technology)?;
    if let Some(freq) = frequency_khz {
        working = working.retain_frequency(radio_kind, freq);
    }

    if working.count(radio_kind) == 0 {
        return Err(Error::InsufficientData(format!(
            "no {} measurements",
            technology.name()
        )));
    }
    if working.count(MeasurementKind::Gnss) == 0 {
        return Err(Error::InsufficientData("no GNSS fixes".to_string()));
    }

    let segmentation = TripSegmenter::new(technology).segment(&working)?;
    warnings.extend(segmentation.warnings.iter().cloned());
    let segmented = segmentation.sources();

    let correlator = IntervalCorrelator::new(technology, settings.strategy)
        .with_window_seconds(settings.window_seconds);
    let scorer = QualityScorer::new(technology, settings.scoring, settings.metric);
    let fixes: Vec<ScoredFix> = correlator
        .correlate(&working, &segmented)
        .into_iter()
        .map(|fix| {
            let score = scorer.score(fix.level, fix.snr);
            ScoredFix { fix, score }
        })
        .collect();

    let series: Vec<TripSeries> = segmentation
        .trips
        .iter()
        .map(|trip| trip_series(trip, settings.metric, settings.resample))
        .collect();

    tracing::info!(
        "Analyzed {} trips: {} radio samples, {} fixes",
        segmentation.trips.len(),
        segmentation.record_count(),
        fixes.len()
    );

    let mut parameters = settings.parameters();
    if settings.frequency_khz.is_none() {
        if let Some(freq) = frequency_khz {
            parameters.push(("frequency_khz".to_string(), freq.to_string()));
        }
    }

    Ok(AnalysisReport {
        technology,
        frequencies,
        frequency_khz,
        reference: segmentation.reference.clone(),
        trips: segmentation.trips.iter().map(TripSummary::from).collect(),
        series,
        fixes,
        metadata: AnalysisMetadata {
            algorithm: format!("{} {} correlation", technology.name(), settings.strategy),
            parameters,
            warnings,
            computation_time_ms: 0,
        },
    })
}

/// An explicit frequency must be present. Without one, several frequencies
/// resolve to the lowest; a single frequency needs no restriction.
fn select_frequency(
    requested: Option<u32>,
    available: &[FrequencyOption],
    technology: Technology,
) -> Result<Option<u32>> {
    match requested {
        Some(freq) => {
            if available.iter().any(|f| f.frequency_khz == freq) {
                Ok(Some(freq))
            } else {
                Err(Error::InsufficientData(format!(
                    "no {} measurements on {} kHz",
                    technology.name(),
                    freq
                )))
            }
        }
        None if available.len() > 1 => {
            let lowest = available[0].frequency_khz;
            tracing::info!(
                "{} frequencies present, analyzing {} kHz",
                available.len(),
                lowest
            );
            Ok(Some(lowest))
        }
        None => Ok(None),
    }
}
