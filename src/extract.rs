//! Batch extraction of a raw log into typed records.

use rayon::prelude::*;
use std::path::Path;

use crate::error::Result;
use crate::loader;
use crate::parsers::{LogEntryParser, Measurement, RawLogEntry};

/// Entries between progress reports
pub const PROGRESS_INTERVAL: usize = 100;

/// Parse every entry, keeping input order.
///
/// `progress` receives a percentage at the start of every block of
/// [`PROGRESS_INTERVAL`] entries and a final 100 when done.
pub fn extract_entries(
    parser: &LogEntryParser,
    entries: &[RawLogEntry],
    mut progress: impl FnMut(u8),
) -> Vec<Measurement> {
    let total = entries.len();
    let mut measurements = Vec::new();

    for (block, chunk) in entries.chunks(PROGRESS_INTERVAL).enumerate() {
        let done = block * PROGRESS_INTERVAL;
        progress((done * 100 / total) as u8);
        measurements.par_extend(chunk.par_iter().filter_map(|e| parser.parse(e)));
    }

    progress(100);
    measurements
}

/// Extract `input` (raw log JSON) into `output` (typed record JSON).
/// Returns the number of records written.
pub fn extract_file(
    input: &Path,
    output: &Path,
    parser: &LogEntryParser,
    progress: impl FnMut(u8),
) -> Result<usize> {
    let entries = loader::read_raw_entries(input)?;
    let measurements = extract_entries(parser, &entries, progress);

    tracing::info!(
        "Extracted {} records from {} log entries",
        measurements.len(),
        entries.len()
    );

    loader::write_records(output, &measurements)?;
    Ok(measurements.len())
}
