//! Tests for analysis settings persistence
//!
//! Tests cover:
//! - Default settings values
//! - Serialization/deserialization
//! - File round trips and error reporting

use radiotrace::analysis::correlate::CorrelationStrategy;
use radiotrace::analysis::quality::ScoringMode;
use radiotrace::analysis::series::Resample;
use radiotrace::parsers::{LevelDecoding, Metric, Technology};
use radiotrace::settings::AnalysisSettings;
use radiotrace::Error;

// ============================================
// Default Settings Tests
// ============================================

#[test]
fn test_settings_defaults() {
    let settings = AnalysisSettings::default();
    assert_eq!(settings.version, 1);
    assert_eq!(settings.technology, Technology::Dab);
    assert_eq!(settings.frequency_khz, None);
    assert_eq!(settings.scoring, ScoringMode::Single);
    assert_eq!(settings.metric, Metric::Level);
    assert_eq!(settings.resample, Resample::FiveSeconds);
    assert_eq!(settings.level_decoding, LevelDecoding::Signed);
}

#[test]
fn test_empty_object_equals_default() {
    let settings: AnalysisSettings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, AnalysisSettings::default());
}

// ============================================
// Serialization Tests
// ============================================

#[test]
fn test_settings_serialize_lowercase_names() {
    let settings = AnalysisSettings {
        technology: Technology::Fm,
        strategy: CorrelationStrategy::Window,
        resample: Resample::TenSeconds,
        level_decoding: LevelDecoding::TrailingMagnitude,
        ..AnalysisSettings::default()
    };
    let json = serde_json::to_value(&settings).unwrap();
    assert_eq!(json["technology"], "fm");
    assert_eq!(json["strategy"], "window");
    assert_eq!(json["resample"], "10s");
    assert_eq!(json["level_decoding"], "trailing_magnitude");
    assert_eq!(json["markers"]["gnss"], "TRK-GNSS");
}

#[test]
fn test_unknown_enum_value_is_rejected() {
    let result: Result<AnalysisSettings, _> = serde_json::from_str(r#"{"technology": "am"}"#);
    assert!(result.is_err());
}

// ============================================
// File Round Trips
// ============================================

#[test]
fn test_settings_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let settings = AnalysisSettings {
        frequency_khz: Some(202928),
        scoring: ScoringMode::Combined,
        window_seconds: 2.5,
        sources: vec!["drive_a.json".to_string()],
        ..AnalysisSettings::default()
    };
    settings.save_to(&path).unwrap();

    let loaded = AnalysisSettings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_invalid_settings_file_is_settings_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = AnalysisSettings::load_from(&path).unwrap_err();
    assert!(matches!(err, Error::Settings(_)));
}

#[test]
fn test_missing_settings_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AnalysisSettings::load_from(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_config_path_ends_with_settings_file() {
    if let Some(path) = AnalysisSettings::get_settings_path() {
        assert!(path.ends_with("settings.json"));
    }
}
