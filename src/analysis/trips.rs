//! Trip segmentation.
//!
//! Aligns several recorded drives on a common timeline. The first GNSS fix of
//! the source with the fewest fixes is the reference point; every source is
//! anchored at its fix closest to that point, and its trip starts at the first
//! radio sample at or after the anchor. Trips are then laid end to end by
//! start time, each running until the next one begins.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::parsers::{MeasurementKind, Technology};
use crate::store::{seconds_between, Sample, SourceId, TimeSeriesStore};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Position every source is aligned against
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferencePoint {
    /// Source the point was taken from
    pub source: SourceId,
    pub time: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
}

/// A radio sample placed on its trip's relative timeline
#[derive(Clone, Debug, Serialize)]
pub struct TripRecord {
    /// Seconds since the trip start
    pub time_rel: f64,
    #[serde(flatten)]
    pub sample: Sample,
}

/// One recorded drive, bounded by its start and the next trip's start
#[derive(Clone, Debug, Serialize)]
pub struct Trip {
    pub source: SourceId,
    pub start: NaiveDateTime,
    /// `None` for the last trip, which is open-ended
    pub end: Option<NaiveDateTime>,
    /// Time of the source's fix closest to the reference point
    pub anchor: Option<NaiveDateTime>,
    pub records: Vec<TripRecord>,
    /// Radio samples of this source that fall outside `[start, end)`
    pub excluded: usize,
}

impl Trip {
    /// Relative time of the last record
    pub fn duration_seconds(&self) -> Option<f64> {
        self.records.last().map(|r| r.time_rel)
    }
}

/// Result of segmenting a set of sources
#[derive(Clone, Debug, Default, Serialize)]
pub struct Segmentation {
    pub reference: Option<ReferencePoint>,
    /// Trips ordered by start time
    pub trips: Vec<Trip>,
    /// Sources that could not be segmented, one message each
    pub warnings: Vec<String>,
}

impl Segmentation {
    /// Segmented sources in trip order
    pub fn sources(&self) -> Vec<SourceId> {
        self.trips.iter().map(|t| t.source.clone()).collect()
    }

    pub fn trip(&self, source: &SourceId) -> Option<&Trip> {
        self.trips.iter().find(|t| &t.source == source)
    }

    /// Total radio samples placed in trips
    pub fn record_count(&self) -> usize {
        self.trips.iter().map(|t| t.records.len()).sum()
    }
}

/// Splits sources into consecutive, non-overlapping trips
#[derive(Clone, Copy, Debug, Default)]
pub struct TripSegmenter {
    technology: Technology,
}

impl TripSegmenter {
    pub fn new(technology: Technology) -> Self {
        Self { technology }
    }

    /// Segment every source in `store`. The store should hold GNSS fixes and
    /// the radio samples of this segmenter's technology.
    pub fn segment(&self, store: &TimeSeriesStore) -> Result<Segmentation> {
        let radio_kind = self.technology.kind();
        let sources = store.sources();
        if sources.is_empty() {
            return Err(Error::InsufficientData("no sources to segment".to_string()));
        }

        let reference = reference_point(store, &sources);
        let mut warnings = Vec::new();
        let mut starts: Vec<(SourceId, NaiveDateTime, Option<NaiveDateTime>)> = Vec::new();

        for source in &sources {
            let radio = store.ordered(source, radio_kind);
            let anchor = reference
                .as_ref()
                .and_then(|r| nearest_fix_time(store.series(source, MeasurementKind::Gnss), r));

            match start_time(&radio, anchor) {
                Some(start) => starts.push((source.clone(), start, anchor)),
                None => {
                    let message = format!(
                        "Source '{}' has no {} measurements and was excluded from segmentation",
                        source,
                        self.technology.name()
                    );
                    tracing::warn!("{}", message);
                    warnings.push(message);
                }
            }
        }

        if starts.is_empty() {
            return Err(Error::InsufficientData(format!(
                "no source has {} measurements",
                self.technology.name()
            )));
        }

        starts.sort_by_key(|(_, start, _)| *start);

        let trips: Vec<Trip> = starts
            .iter()
            .enumerate()
            .map(|(i, (source, start, anchor))| {
                let end = starts.get(i + 1).map(|(_, next, _)| *next);
                let total = store.series(source, radio_kind).len();

                let records: Vec<TripRecord> = store
                    .filter_by_source(source)
                    .filter_by_time_range(*start, end)
                    .ordered(source, radio_kind)
                    .into_iter()
                    .map(|sample| TripRecord {
                        time_rel: seconds_between(*start, sample.time),
                        sample,
                    })
                    .collect();

                Trip {
                    source: source.clone(),
                    start: *start,
                    end,
                    anchor: *anchor,
                    excluded: total - records.len(),
                    records,
                }
            })
            .collect();

        tracing::debug!(
            "Segmented {} trips ({} radio samples)",
            trips.len(),
            trips.iter().map(|t| t.records.len()).sum::<usize>()
        );

        Ok(Segmentation {
            reference,
            trips,
            warnings,
        })
    }
}

/// First fix (recorded order) of the source with the fewest fixes.
/// Ties go to the source encountered first.
fn reference_point(store: &TimeSeriesStore, sources: &[SourceId]) -> Option<ReferencePoint> {
    let mut best: Option<(&SourceId, &[Sample])> = None;
    for source in sources {
        let fixes = store.series(source, MeasurementKind::Gnss);
        if fixes.is_empty() {
            continue;
        }
        if best.map_or(true, |(_, current)| fixes.len() < current.len()) {
            best = Some((source, fixes));
        }
    }

    let (source, fixes) = best?;
    let first = fixes.first()?;
    let fix = first.measurement.as_gnss()?;
    Some(ReferencePoint {
        source: source.clone(),
        time: first.time,
        lat: fix.lat,
        lon: fix.lon,
    })
}

/// Time of the fix closest to the reference point; the first one wins on ties
fn nearest_fix_time(fixes: &[Sample], reference: &ReferencePoint) -> Option<NaiveDateTime> {
    let mut nearest: Option<(f64, NaiveDateTime)> = None;
    for sample in fixes {
        let Some(fix) = sample.measurement.as_gnss() else {
            continue;
        };
        let distance = haversine_distance(fix.lat, fix.lon, reference.lat, reference.lon);
        if nearest.map_or(true, |(best, _)| distance < best) {
            nearest = Some((distance, sample.time));
        }
    }
    nearest.map(|(_, time)| time)
}

/// First radio sample at or after the anchor, else the first radio sample.
/// `radio` must be time-ordered.
fn start_time(radio: &[Sample], anchor: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    anchor
        .and_then(|anchor| radio.iter().find(|s| s.time >= anchor))
        .or_else(|| radio.first())
        .map(|s| s.time)
}
