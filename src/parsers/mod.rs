//! Log entry classification and measurement extraction.
//!
//! Each entry is classified once by marker substring and then handed to the
//! single extractor for that kind. Entries whose marker matches but whose
//! payload does not are dropped silently.

pub mod dab;
pub mod fm;
pub mod gnss;
pub mod types;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use dab::{Dab, LevelDecoding};
pub use fm::Fm;
pub use gnss::Gnss;
pub use types::{
    DabSample, Extractor, Field, FmSample, GnssFix, Measurement, MeasurementKind, Metric,
    RawLogEntry, Technology,
};

/// Marker substrings identifying each kind of diagnostic line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSet {
    pub dab: String,
    /// One marker per tuner index to accept
    pub fm: Vec<String>,
    pub gnss: String,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            dab: "MER_NXP_MOD# Qual".to_string(),
            fm: vec!["T[1/0x231]".to_string()],
            gnss: "TRK-GNSS".to_string(),
        }
    }
}

impl MarkerSet {
    /// Classify a message. Markers are checked DAB, FM, GNSS and the first
    /// hit wins, so a line is never recognised as more than one kind.
    pub fn classify(&self, message: &str) -> Option<MeasurementKind> {
        if !self.dab.is_empty() && message.contains(&self.dab) {
            Some(MeasurementKind::Dab)
        } else if self
            .fm
            .iter()
            .any(|m| !m.is_empty() && message.contains(m.as_str()))
        {
            Some(MeasurementKind::Fm)
        } else if !self.gnss.is_empty() && message.contains(&self.gnss) {
            Some(MeasurementKind::Gnss)
        } else {
            None
        }
    }
}

/// Turns raw log entries into typed measurements
#[derive(Clone, Debug, Default)]
pub struct LogEntryParser {
    markers: MarkerSet,
    dab: Dab,
    fm: Fm,
    gnss: Gnss,
}

impl LogEntryParser {
    pub fn new(markers: MarkerSet, level_decoding: LevelDecoding) -> Self {
        Self {
            markers,
            dab: Dab::new(level_decoding),
            fm: Fm,
            gnss: Gnss,
        }
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn classify(&self, entry: &RawLogEntry) -> Option<MeasurementKind> {
        self.markers.classify(&entry.message)
    }

    /// Parse one entry into zero or one measurement
    pub fn parse(&self, entry: &RawLogEntry) -> Option<Measurement> {
        match self.classify(entry)? {
            MeasurementKind::Dab => self.dab.extract(entry),
            MeasurementKind::Fm => self.fm.extract(entry),
            MeasurementKind::Gnss => self.gnss.extract(entry),
        }
    }

    /// Parse a batch of entries in parallel, keeping input order
    pub fn parse_all(&self, entries: &[RawLogEntry]) -> Vec<Measurement> {
        entries.par_iter().filter_map(|e| self.parse(e)).collect()
    }
}
