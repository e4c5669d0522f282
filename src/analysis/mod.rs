//! Analysis of extracted radio and GNSS measurements.
//!
//! A pass runs the stages in order, each in its own module:
//! - [`trips`]: align recorded drives on a shared timeline
//! - [`correlate`]: attach aggregated radio metrics to GNSS fixes
//! - [`quality`]: band the aggregates into quality categories and colors
//! - [`series`]: per-trip metric series for charting
//!
//! [`pipeline::run`] wires them together and returns an [`AnalysisReport`].

pub mod correlate;
pub mod pipeline;
pub mod quality;
pub mod series;
pub mod trips;

use serde::Serialize;
use std::time::Instant;

pub use pipeline::{run, AnalysisReport, FrequencyOption, ScoredFix, TripSummary};

/// Metadata about an analysis pass
#[derive(Clone, Debug, Default, Serialize)]
pub struct AnalysisMetadata {
    /// Name of the algorithm used
    pub algorithm: String,
    /// Key parameters and their values
    pub parameters: Vec<(String, String)>,
    /// Warning messages about the analysis
    pub warnings: Vec<String>,
    /// Time taken for computation in milliseconds
    pub computation_time_ms: u64,
}

impl AnalysisMetadata {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Helper function to measure analysis execution time
pub fn timed_analyze<F, T>(f: F) -> (T, u64)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_millis() as u64;
    (result, elapsed)
}
