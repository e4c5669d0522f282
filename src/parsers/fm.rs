use regex::Regex;
use std::sync::LazyLock;

use super::types::{Extractor, FmSample, Measurement, RawLogEntry};

static TUNER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"fq (?<freq>\d+), fs (?<fs>\d+), .*?snr (?<snr>\d+)")
        .expect("Failed to compile FM regex")
});

/// FM tuner status line extractor
#[derive(Clone, Copy, Debug, Default)]
pub struct Fm;

impl Extractor for Fm {
    fn extract(&self, entry: &RawLogEntry) -> Option<Measurement> {
        let captures = TUNER_PATTERN.captures(&entry.message)?;

        Some(Measurement::Fm(FmSample {
            timestamp: entry.timestamp.clone(),
            frequency_khz: captures["freq"].parse().ok()?,
            field_strength: captures["fs"].parse().ok()?,
            snr: captures["snr"].parse().ok()?,
        }))
    }
}
