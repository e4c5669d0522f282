//! File loading integration tests
//!
//! Tests for raw log extraction to disk and loading typed record files back
//! into a store, one source per file.

use crate::common::raw::*;
use radiotrace::extract::extract_file;
use radiotrace::loader::{load_record_files, read_raw_entries, write_records};
use radiotrace::parsers::{LevelDecoding, LogEntryParser, MeasurementKind, RawLogEntry};
use radiotrace::settings::AnalysisSettings;
use radiotrace::store::SourceId;
use radiotrace::Error;
use std::path::{Path, PathBuf};

fn write_raw(dir: &Path, name: &str, entries: &[RawLogEntry]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(entries).unwrap()).unwrap();
    path
}

fn raw_drive(offset: f64, fixes: usize) -> Vec<RawLogEntry> {
    let mut entries = Vec::new();
    for i in 0..fixes {
        let t = offset + i as f64 * 10.0;
        entries.push(gnss_line(t, 48.0 + i as f64 * 0.001, 11.0));
        entries.push(dab_line(t + 1.0, 225648, -65, 14));
        entries.push(fm_line(t + 2.0, 98100, 45, 28));
        entries.push(noise_line(t + 3.0));
    }
    entries
}

// ============================================
// Extraction To Disk
// ============================================

#[test]
fn test_extract_file_complete_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_raw(dir.path(), "raw.json", &raw_drive(0.0, 30));
    let output = dir.path().join("records.json");

    let mut reports = Vec::new();
    let count = extract_file(&input, &output, &LogEntryParser::default(), |p| {
        reports.push(p)
    })
    .unwrap();

    assert_eq!(count, 90);
    assert_eq!(reports, vec![0, 83, 100]);

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("[\n"), "records should be pretty printed");
    let records: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
    assert_eq!(records.len(), 90);
    assert_eq!(records[0]["type"], "gnss");
    assert_eq!(records[1]["type"], "dab");
    assert_eq!(records[2]["type"], "fm");
    assert!(records.iter().all(|r| r.get("source").is_none()));
}

#[test]
fn test_settings_file_selects_level_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let entries = vec![RawLogEntry::new(
        crate::common::ts(0.0),
        "MER_NXP_MOD# Qual F=225648kHz TL=0085 SNR=9",
    )];
    let input = write_raw(dir.path(), "raw.json", &entries);

    let settings_path = dir.path().join("settings.json");
    std::fs::write(&settings_path, r#"{"level_decoding": "trailing_magnitude"}"#).unwrap();
    let settings = AnalysisSettings::load_from(&settings_path).unwrap();
    assert_eq!(settings.level_decoding, LevelDecoding::TrailingMagnitude);

    let levels = |parser: &LogEntryParser| {
        let output = dir.path().join("records.json");
        extract_file(&input, &output, parser, |_| {}).unwrap();
        let records: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        records[0]["TL"].clone()
    };
    assert_eq!(levels(&settings.parser()), -85);
    assert_eq!(levels(&AnalysisSettings::default().parser()), 85);
}

#[test]
fn test_extract_missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = extract_file(
        &dir.path().join("absent.json"),
        &dir.path().join("out.json"),
        &LogEntryParser::default(),
        |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_raw_log_must_be_entry_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.json");
    std::fs::write(&path, r#"{"entries": []}"#).unwrap();
    let err = read_raw_entries(&path).unwrap_err();
    assert!(matches!(err, Error::MalformedInput { .. }));
}

#[test]
fn test_raw_entries_tolerate_missing_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.json");
    std::fs::write(&path, r#"[{"timeStamp": "2024-05-10T10:00:00"}]"#).unwrap();
    let entries = read_raw_entries(&path).unwrap();
    assert_eq!(entries[0].message, "");
}

// ============================================
// Record Loading
// ============================================

#[test]
fn test_each_file_becomes_a_source() {
    let dir = tempfile::tempdir().unwrap();
    let parser = LogEntryParser::default();
    let mut paths = Vec::new();
    for (name, offset) in [("drive_a.json", 0.0), ("drive_b.json", 600.0)] {
        let records = parser.parse_all(&raw_drive(offset, 5));
        let path = dir.path().join(name);
        write_records(&path, &records).unwrap();
        paths.push(path);
    }

    let store = load_record_files(&paths).unwrap();
    assert_eq!(
        store.sources(),
        vec![SourceId::from("drive_a.json"), SourceId::from("drive_b.json")]
    );
    assert_eq!(store.count(MeasurementKind::Gnss), 10);
    assert_eq!(store.count(MeasurementKind::Dab), 10);
    assert_eq!(store.count(MeasurementKind::Fm), 10);
}

#[test]
fn test_empty_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, "  \n").unwrap();
    let good = dir.path().join("good.json");
    write_records(
        &good,
        &LogEntryParser::default().parse_all(&raw_drive(0.0, 2)),
    )
    .unwrap();

    let store = load_record_files(&[empty, good]).unwrap();
    assert_eq!(store.sources(), vec![SourceId::from("good.json")]);
}

#[test]
fn test_invalid_record_file_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"type\": \"dab\", ").unwrap();

    let err = load_record_files(&[path]).unwrap_err();
    assert!(matches!(err, Error::MalformedInput { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_record_with_bad_timestamp_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drive.json");
    std::fs::write(
        &path,
        r#"[{"type": "fm", "timeStamp": "noon", "FQ_kHz": 98100, "FS": 40, "SNR": 20}]"#,
    )
    .unwrap();

    let err = load_record_files(&[path]).unwrap_err();
    assert!(matches!(err, Error::MalformedInput { .. }));
}
