//! Signal quality scoring.
//!
//! Maps aggregated radio metrics to an ordinal quality category and a display
//! color. Two modes are available:
//!
//! - **Single**: one metric against a technology-specific band table
//! - **Combined**: SNR and level normalized to 0-100, averaged, then banded
//!
//! A missing aggregate always scores as [`Quality::NoData`], whose color is
//! distinct from every band color.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::parsers::{Metric, Technology};

pub type Rgb = [u8; 3];

/// Quality category, ordered worst to best. `NoData` sorts below everything.
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Display,
    EnumString,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum Quality {
    #[strum(serialize = "No data")]
    NoData,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Quality {
    pub fn color(&self) -> Rgb {
        match self {
            Quality::NoData => [255, 255, 255],
            Quality::Poor => [255, 70, 70],
            Quality::Fair => [255, 220, 0],
            Quality::Good => [160, 220, 100],
            Quality::Excellent => [0, 180, 0],
        }
    }
}

/// Scoring mode
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
pub enum ScoringMode {
    #[default]
    Single,
    Combined,
}

/// Lower bound of a band; values at or above (or strictly above) it qualify
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub bound: f64,
    pub inclusive: bool,
    pub quality: Quality,
}

impl Band {
    const fn above(bound: f64, quality: Quality) -> Self {
        Self {
            bound,
            inclusive: false,
            quality,
        }
    }

    const fn at_least(bound: f64, quality: Quality) -> Self {
        Self {
            bound,
            inclusive: true,
            quality,
        }
    }

    fn admits(&self, value: f64) -> bool {
        if self.inclusive {
            value >= self.bound
        } else {
            value > self.bound
        }
    }
}

/// Ordered band table; the first admitting band wins, otherwise `floor`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandTable {
    pub bands: &'static [Band],
    pub floor: Quality,
}

impl BandTable {
    pub fn classify(&self, value: Option<f64>) -> Quality {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return Quality::NoData;
        };
        self.bands
            .iter()
            .find(|band| band.admits(value))
            .map_or(self.floor, |band| band.quality)
    }
}

const DAB_LEVEL: BandTable = BandTable {
    bands: &[
        Band::above(-50.0, Quality::Excellent),
        Band::above(-75.0, Quality::Good),
        Band::above(-90.0, Quality::Fair),
    ],
    floor: Quality::Poor,
};

const FM_FIELD_STRENGTH: BandTable = BandTable {
    bands: &[
        Band::above(60.0, Quality::Excellent),
        Band::above(40.0, Quality::Good),
        Band::above(20.0, Quality::Fair),
    ],
    floor: Quality::Poor,
};

const DAB_SNR: BandTable = BandTable {
    bands: &[
        Band::at_least(15.0, Quality::Good),
        Band::at_least(8.0, Quality::Fair),
    ],
    floor: Quality::Poor,
};

const FM_SNR: BandTable = BandTable {
    bands: &[
        Band::at_least(30.0, Quality::Good),
        Band::at_least(15.0, Quality::Fair),
    ],
    floor: Quality::Poor,
};

const COMBINED: BandTable = BandTable {
    bands: &[
        Band::at_least(66.0, Quality::Good),
        Band::at_least(33.0, Quality::Fair),
    ],
    floor: Quality::Poor,
};

/// Band table for a single metric of a technology
pub fn band_table(technology: Technology, metric: Metric) -> BandTable {
    match (technology, metric) {
        (Technology::Dab, Metric::Level) => DAB_LEVEL,
        (Technology::Fm, Metric::Level) => FM_FIELD_STRENGTH,
        (Technology::Dab, Metric::Snr) => DAB_SNR,
        (Technology::Fm, Metric::Snr) => FM_SNR,
    }
}

/// Band table for the 0-100 combined score
pub fn combined_table() -> BandTable {
    COMBINED
}

/// SNR mapped onto 0-100; 20 dB and above is full scale
pub fn normalize_snr(snr: f64) -> f64 {
    (snr / 20.0).clamp(0.0, 1.0) * 100.0
}

/// Level metric mapped onto 0-100.
/// DAB: -100 dBm to -80 dBm. FM: 20 dBµV to 60 dBµV.
pub fn normalize_level(technology: Technology, level: f64) -> f64 {
    let unit = match technology {
        Technology::Dab => (level + 100.0) / 20.0,
        Technology::Fm => (level - 20.0) / 40.0,
    };
    unit.clamp(0.0, 1.0) * 100.0
}

/// Equal-weight mean of normalized SNR and level. A missing input counts as
/// 0; if both are missing the score is missing.
pub fn combined_score(technology: Technology, level: Option<f64>, snr: Option<f64>) -> Option<f64> {
    if level.is_none() && snr.is_none() {
        return None;
    }
    let snr_term = snr.map_or(0.0, normalize_snr);
    let level_term = level.map_or(0.0, |l| normalize_level(technology, l));
    Some((snr_term + level_term) / 2.0)
}

/// Scored metric ready for rendering
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Score {
    /// The metric (single mode) or 0-100 score (combined mode) that was banded
    pub value: Option<f64>,
    pub quality: Quality,
    pub color: Rgb,
}

/// Pure mapping from aggregated metrics to a quality category
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityScorer {
    pub technology: Technology,
    pub mode: ScoringMode,
    /// Metric banded in single mode
    pub metric: Metric,
}

impl QualityScorer {
    pub fn new(technology: Technology, mode: ScoringMode, metric: Metric) -> Self {
        Self {
            technology,
            mode,
            metric,
        }
    }

    pub fn score(&self, level: Option<f64>, snr: Option<f64>) -> Score {
        let (value, table) = match self.mode {
            ScoringMode::Single => {
                let value = match self.metric {
                    Metric::Level => level,
                    Metric::Snr => snr,
                };
                (value, band_table(self.technology, self.metric))
            }
            ScoringMode::Combined => (
                combined_score(self.technology, level, snr),
                combined_table(),
            ),
        };
        let quality = table.classify(value);
        Score {
            value,
            quality,
            color: quality.color(),
        }
    }
}
