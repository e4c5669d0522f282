//! Field extraction tests
//!
//! Numeric fields equal the literal digits in the line, sign included.
//! Lines whose marker matches but whose payload does not are dropped.

use crate::common::raw::*;
use radiotrace::extract::extract_entries;
use radiotrace::parsers::{LevelDecoding, LogEntryParser, MarkerSet, Measurement, RawLogEntry};

// ============================================
// DAB
// ============================================

#[test]
fn test_dab_fields_match_literal_digits() {
    let parser = LogEntryParser::default();
    match parser.parse(&dab_line(1.5, 225648, -73, 11)).unwrap() {
        Measurement::Dab(d) => {
            assert_eq!(d.timestamp, "2024-05-10T10:00:01.500");
            assert_eq!(d.frequency_khz, 225648);
            assert_eq!(d.level, -73);
            assert_eq!(d.snr, 11);
        }
        other => panic!("Expected DAB sample, got {:?}", other),
    }
}

#[test]
fn test_dab_rssi_variant() {
    let parser = LogEntryParser::default();
    let entry = RawLogEntry::new(
        "2024-05-10T10:00:00",
        "MER_NXP_MOD# Qual: F=202928kHz, RSSI=-88, SNR=4",
    );
    let m = parser.parse(&entry).unwrap();
    assert_eq!(m.level(), Some(-88.0));
    assert_eq!(m.frequency_khz(), Some(202928));
}

#[test]
fn test_dab_trailing_magnitude_is_opt_in() {
    let entry = RawLogEntry::new("2024-05-10T10:00:00", "MER_NXP_MOD# Qual: F=225648kHz, TL=-1073, SNR=9");

    let plain = LogEntryParser::default().parse(&entry).unwrap();
    assert_eq!(plain.level(), Some(-1073.0));

    let decoded = LogEntryParser::new(MarkerSet::default(), LevelDecoding::TrailingMagnitude)
        .parse(&entry)
        .unwrap();
    assert_eq!(decoded.level(), Some(-73.0));
}

#[test]
fn test_dab_marker_with_bad_payload_is_dropped() {
    let parser = LogEntryParser::default();
    let entries = [
        RawLogEntry::new("t", "MER_NXP_MOD# Qual: F=kHz, TL=-60, SNR=12"),
        RawLogEntry::new("t", "MER_NXP_MOD# Qual: F=225648kHz, TL=-60"),
        RawLogEntry::new("t", "MER_NXP_MOD# Qual: F=99999999999kHz, TL=-60, SNR=1"),
    ];
    for entry in &entries {
        assert!(parser.parse(entry).is_none(), "{}", entry.message);
    }
}

// ============================================
// FM
// ============================================

#[test]
fn test_fm_fields_match_literal_digits() {
    let parser = LogEntryParser::default();
    match parser.parse(&fm_line(0.0, 98100, 52, 31)).unwrap() {
        Measurement::Fm(f) => {
            assert_eq!(f.frequency_khz, 98100);
            assert_eq!(f.field_strength, 52);
            assert_eq!(f.snr, 31);
        }
        other => panic!("Expected FM sample, got {:?}", other),
    }
}

#[test]
fn test_fm_requires_comma_layout() {
    let parser = LogEntryParser::default();
    let entry = RawLogEntry::new("t", "T[1/0x231] fq 98100 fs 52 snr 31");
    assert!(parser.parse(&entry).is_none());
}

// ============================================
// GNSS
// ============================================

#[test]
fn test_gnss_fields() {
    let parser = LogEntryParser::default();
    match parser.parse(&gnss_line(2.0, 48.137154, -11.5)).unwrap() {
        Measurement::Gnss(g) => {
            assert_eq!(g.epoch_seconds, 1_715_335_202.0);
            assert_eq!(g.lat, 48.137154);
            assert_eq!(g.lon, -11.5);
            assert_eq!(g.heading, "87.5");
            assert_eq!(g.fix_quality, 3);
            assert_eq!(g.antenna, 1);
        }
        other => panic!("Expected GNSS fix, got {:?}", other),
    }
}

#[test]
fn test_gnss_word_heading_is_kept_verbatim() {
    let parser = LogEntryParser::default();
    let entry = RawLogEntry::new(
        "t",
        "TRK-GNSS ts=1715335200.0, pos=(48.1, 11.5, 500.0), hdg=nan, fix=0, antenna=2",
    );
    let m = parser.parse(&entry).unwrap();
    assert_eq!(m.as_gnss().unwrap().heading, "nan");
}

// ============================================
// Record Shape
// ============================================

#[test]
fn test_records_serialize_with_type_tag() {
    let parser = LogEntryParser::default();
    let m = parser.parse(&dab_line(0.0, 225648, -60, 12)).unwrap();
    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["type"], "dab");
    assert_eq!(json["F_kHz"], 225648);
    assert_eq!(json["TL"], -60);
    assert_eq!(json["SNR"], 12);

    let fix = parser.parse(&gnss_line(0.0, 48.0, 11.0)).unwrap();
    let json = serde_json::to_value(&fix).unwrap();
    assert_eq!(json["type"], "gnss");
    assert_eq!(json["hdg"], "87.5");
    assert_eq!(json["fix"], 3);
}

// ============================================
// Batch Extraction
// ============================================

#[test]
fn test_batch_extraction_keeps_order_and_reports_progress() {
    let mut entries = Vec::new();
    for i in 0..150 {
        let t = i as f64;
        entries.push(gnss_line(t, 48.0, 11.0));
        entries.push(dab_line(t + 0.5, 225648, -60, 12));
        if i % 3 == 0 {
            entries.push(noise_line(t + 0.7));
        }
    }

    let mut reports = Vec::new();
    let out = extract_entries(&LogEntryParser::default(), &entries, |p| reports.push(p));

    assert_eq!(out.len(), 300);
    assert_eq!(reports.len(), entries.len().div_ceil(100) + 1);
    assert_eq!(reports.first(), Some(&0));
    assert_eq!(reports.last(), Some(&100));
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));

    let times: Vec<&str> = out.iter().map(|m| m.timestamp()).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}
