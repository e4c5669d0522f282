use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// One line of a recorder's diagnostic log, as delivered by the file loader
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogEntry {
    #[serde(rename = "timeStamp", default)]
    pub timestamp: String,
    #[serde(rename = "msgData", default)]
    pub message: String,
}

impl RawLogEntry {
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }
}

/// DAB tuner quality sample
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DabSample {
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    #[serde(rename = "F_kHz")]
    pub frequency_khz: u32,
    /// Tuner level (TL) or RSSI, dBm-like and signed
    #[serde(rename = "TL", alias = "RSSI")]
    pub level: i32,
    #[serde(rename = "SNR")]
    pub snr: u32,
}

/// FM tuner quality sample
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FmSample {
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    #[serde(rename = "FQ_kHz")]
    pub frequency_khz: u32,
    /// Field strength in dBµV
    #[serde(rename = "FS")]
    pub field_strength: i32,
    #[serde(rename = "SNR")]
    pub snr: u32,
}

/// Position fix from the GNSS tracker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GnssFix {
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    #[serde(rename = "ts")]
    pub epoch_seconds: f64,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "hdg")]
    pub heading: String,
    #[serde(rename = "fix")]
    pub fix_quality: u32,
    pub antenna: u32,
}

/// A typed measurement extracted from a single log entry.
///
/// Serializes to the flat record shape consumed by renderers, e.g.
/// `{"type": "dab", "timeStamp": "...", "F_kHz": 225648, "TL": -62, "SNR": 14}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Measurement {
    Dab(DabSample),
    Fm(FmSample),
    Gnss(GnssFix),
}

impl Measurement {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            Measurement::Dab(_) => MeasurementKind::Dab,
            Measurement::Fm(_) => MeasurementKind::Fm,
            Measurement::Gnss(_) => MeasurementKind::Gnss,
        }
    }

    /// Raw timestamp text as recorded
    pub fn timestamp(&self) -> &str {
        match self {
            Measurement::Dab(d) => &d.timestamp,
            Measurement::Fm(f) => &f.timestamp,
            Measurement::Gnss(g) => &g.timestamp,
        }
    }

    pub fn frequency_khz(&self) -> Option<u32> {
        match self {
            Measurement::Dab(d) => Some(d.frequency_khz),
            Measurement::Fm(f) => Some(f.frequency_khz),
            Measurement::Gnss(_) => None,
        }
    }

    /// Signal level metric: TL/RSSI for DAB, field strength for FM
    pub fn level(&self) -> Option<f64> {
        match self {
            Measurement::Dab(d) => Some(d.level as f64),
            Measurement::Fm(f) => Some(f.field_strength as f64),
            Measurement::Gnss(_) => None,
        }
    }

    pub fn snr(&self) -> Option<f64> {
        match self {
            Measurement::Dab(d) => Some(d.snr as f64),
            Measurement::Fm(f) => Some(f.snr as f64),
            Measurement::Gnss(_) => None,
        }
    }

    /// Value of a radio metric, if this measurement carries it
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Level => self.level(),
            Metric::Snr => self.snr(),
        }
    }

    /// Numeric value of a named field, used for equality filtering
    pub fn field(&self, field: Field) -> Option<f64> {
        match (field, self) {
            (Field::FrequencyKhz, m) => m.frequency_khz().map(f64::from),
            (Field::Level, m) => m.level(),
            (Field::Snr, m) => m.snr(),
            (Field::FixQuality, Measurement::Gnss(g)) => Some(g.fix_quality as f64),
            (Field::Antenna, Measurement::Gnss(g)) => Some(g.antenna as f64),
            _ => None,
        }
    }

    pub fn as_gnss(&self) -> Option<&GnssFix> {
        match self {
            Measurement::Gnss(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_radio(&self) -> bool {
        !matches!(self, Measurement::Gnss(_))
    }
}

/// Measurement kinds, one per recognised marker
#[derive(
    AsRefStr, Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Dab,
    Fm,
    Gnss,
}

/// Radio technology under analysis
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
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    #[default]
    Dab,
    Fm,
}

impl Technology {
    pub fn name(&self) -> &'static str {
        match self {
            Technology::Dab => "DAB",
            Technology::Fm => "FM",
        }
    }

    /// Measurement kind carrying this technology's samples
    pub fn kind(&self) -> MeasurementKind {
        match self {
            Technology::Dab => MeasurementKind::Dab,
            Technology::Fm => MeasurementKind::Fm,
        }
    }

    /// Short name of the level metric in the record shape
    pub fn level_name(&self) -> &'static str {
        match self {
            Technology::Dab => "TL",
            Technology::Fm => "FS",
        }
    }

    /// Axis label for the level metric
    pub fn level_label(&self) -> &'static str {
        match self {
            Technology::Dab => "Tuner Level (dBm)",
            Technology::Fm => "Field Strength (dBµV)",
        }
    }
}

/// Radio metric selector
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
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// TL/RSSI for DAB, field strength for FM
    #[default]
    Level,
    Snr,
}

/// Fields usable with `TimeSeriesStore::filter_by_field_equals`
#[derive(AsRefStr, Clone, Copy, Debug, EnumString, PartialEq, Eq)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Field {
    FrequencyKhz,
    Level,
    Snr,
    FixQuality,
    Antenna,
}

/// Pattern-based extraction for one measurement kind.
///
/// Implementations only run after the entry has been classified as their
/// kind; returning `None` means the payload did not match and the entry is
/// dropped.
pub trait Extractor {
    fn extract(&self, entry: &RawLogEntry) -> Option<Measurement>;
}
