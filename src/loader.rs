//! File I/O for raw logs and typed record files.
//!
//! This is the only module that touches the filesystem for measurement data.
//! Every sample loaded from a record file is labeled with that file's name.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::parsers::{Measurement, RawLogEntry};
use crate::store::{SourceId, TimeSeriesStore};

/// Read a raw log: a JSON array of `{"timeStamp", "msgData"}` objects
pub fn read_raw_entries(path: &Path) -> Result<Vec<RawLogEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_raw_entries(&content, &path.display().to_string())
}

/// Parse raw log JSON. `origin` names the input in error messages.
pub fn parse_raw_entries(json: &str, origin: &str) -> Result<Vec<RawLogEntry>> {
    serde_json::from_str(json).map_err(|e| Error::malformed(origin, e))
}

/// Label for samples loaded from `path`
pub fn source_label(path: &Path) -> SourceId {
    path.file_name()
        .map(|name| SourceId::new(name.to_string_lossy()))
        .unwrap_or_else(|| SourceId::new(path.display().to_string()))
}

/// Parse a typed record array into `store` under `source`.
///
/// Records whose `type` is not a known measurement kind are skipped. A known
/// kind with missing or mistyped fields is malformed. Returns the number of
/// records appended.
pub fn parse_records(json: &str, source: &SourceId, store: &mut TimeSeriesStore) -> Result<usize> {
    let records: Vec<Value> =
        serde_json::from_str(json).map_err(|e| Error::malformed(source.as_str(), e))?;

    let mut appended = 0;
    let mut skipped = 0;
    for (index, record) in records.into_iter().enumerate() {
        let known = record
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| matches!(t, "dab" | "fm" | "gnss"));
        if !known {
            skipped += 1;
            continue;
        }

        let measurement: Measurement = serde_json::from_value(record)
            .map_err(|e| Error::malformed(source.as_str(), format!("record {}: {}", index, e)))?;
        store.append(source.clone(), measurement)?;
        appended += 1;
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} untyped records in {}", skipped, source);
    }
    Ok(appended)
}

/// Load several record files into one store, one source per file.
/// Empty files are skipped with a warning.
pub fn load_record_files(paths: &[PathBuf]) -> Result<TimeSeriesStore> {
    let mut store = TimeSeriesStore::new();
    for path in paths {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let source = source_label(path);
        if content.trim().is_empty() {
            tracing::warn!("{} is empty, skipping", path.display());
            continue;
        }

        let count = parse_records(&content, &source, &mut store)?;
        tracing::info!("Loaded {} records from {}", count, source);
    }
    Ok(store)
}

/// Write typed records as a pretty-printed JSON array
pub fn write_records(path: &Path, records: &[Measurement]) -> Result<()> {
    let content = serde_json::to_string_pretty(records)
        .map_err(|e| Error::malformed(path.display().to_string(), e))?;
    std::fs::write(path, content).map_err(|e| Error::io(path, e))
}
