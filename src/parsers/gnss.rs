use regex::Regex;
use std::sync::LazyLock;

use super::types::{Extractor, GnssFix, Measurement, RawLogEntry};

static FIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"ts=(?<ts>[\d\.]+), pos=\((?<lat>[-\d\.]+), (?<lon>[-\d\.]+),.*?\), hdg=(?<hdg>[\-\w\.]+), fix=(?<fix>\d+), antenna=(?<antenna>\d+)",
    )
    .expect("Failed to compile GNSS regex")
});

/// GNSS tracker line extractor
#[derive(Clone, Copy, Debug, Default)]
pub struct Gnss;

impl Extractor for Gnss {
    fn extract(&self, entry: &RawLogEntry) -> Option<Measurement> {
        let captures = FIX_PATTERN.captures(&entry.message)?;

        Some(Measurement::Gnss(GnssFix {
            timestamp: entry.timestamp.clone(),
            epoch_seconds: captures["ts"].parse().ok()?,
            lat: captures["lat"].parse().ok()?,
            lon: captures["lon"].parse().ok()?,
            heading: captures["hdg"].to_string(),
            fix_quality: captures["fix"].parse().ok()?,
            antenna: captures["antenna"].parse().ok()?,
        }))
    }
}
