use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use strum::{AsRefStr, EnumString};

use super::types::{DabSample, Extractor, Measurement, RawLogEntry};

static QUALITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"F=(?<freq>\d+)kHz.*?(?:TL|RSSI)=(?<level>-?\d+).*?SNR=(?<snr>\d+)")
        .expect("Failed to compile DAB regex")
});

/// How the DAB level field text is turned into a number
#[derive(
    AsRefStr, Clone, Copy, Debug, Default, EnumString, PartialEq, Eq, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum LevelDecoding {
    /// Plain signed decimal, e.g. `TL=-62`
    #[default]
    Signed,
    /// Workaround for one recorder that writes the level as a fixed-width
    /// field with an unreliable sign: the last two characters are read as an
    /// unsigned magnitude and the level is its negation (`-070`, `0070` and
    /// `70` all decode to -70). Must be opted into; it does not hold for
    /// recorders that write plain signed values.
    TrailingMagnitude,
}

impl LevelDecoding {
    pub fn decode(&self, raw: &str) -> Option<i32> {
        match self {
            LevelDecoding::Signed => raw.parse().ok(),
            LevelDecoding::TrailingMagnitude => {
                let digits = raw.trim_start_matches('-');
                let tail = &digits[digits.len().saturating_sub(2)..];
                tail.parse::<u8>().ok().map(|m| -(m as i32))
            }
        }
    }
}

/// DAB tuner quality line extractor
#[derive(Clone, Copy, Debug, Default)]
pub struct Dab {
    pub level_decoding: LevelDecoding,
}

impl Dab {
    pub fn new(level_decoding: LevelDecoding) -> Self {
        Self { level_decoding }
    }
}

impl Extractor for Dab {
    fn extract(&self, entry: &RawLogEntry) -> Option<Measurement> {
        let captures = QUALITY_PATTERN.captures(&entry.message)?;

        Some(Measurement::Dab(DabSample {
            timestamp: entry.timestamp.clone(),
            frequency_khz: captures["freq"].parse().ok()?,
            level: self.level_decoding.decode(&captures["level"])?,
            snr: captures["snr"].parse().ok()?,
        }))
    }
}
