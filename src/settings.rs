//! Analysis settings persistence.
//!
//! One explicit settings object is passed to every analysis stage. It can be
//! stored as JSON, either at a chosen path or in the platform config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::correlate::{CorrelationStrategy, DEFAULT_WINDOW_SECONDS};
use crate::analysis::quality::ScoringMode;
use crate::analysis::series::Resample;
use crate::error::{Error, Result};
use crate::parsers::{LevelDecoding, LogEntryParser, MarkerSet, Metric, Technology};

/// Widest accepted half-width of the correlation window
pub const MAX_WINDOW_SECONDS: f64 = 3600.0;

/// Settings for one analysis pass
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub technology: Technology,
    /// Carrier frequency to analyze. When unset and several are present, the lowest is used.
    #[serde(default)]
    pub frequency_khz: Option<u32>,
    #[serde(default)]
    pub strategy: CorrelationStrategy,
    /// Half-width of the symmetric correlation window
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,
    #[serde(default)]
    pub scoring: ScoringMode,
    /// Metric scored in single mode and plotted in the trip series
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub resample: Resample,
    #[serde(default)]
    pub level_decoding: LevelDecoding,
    #[serde(default)]
    pub markers: MarkerSet,
    /// Sources to include; empty means every loaded source
    #[serde(default)]
    pub sources: Vec<String>,
}

fn default_version() -> u32 {
    1
}

fn default_window_seconds() -> f64 {
    DEFAULT_WINDOW_SECONDS
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            technology: Technology::default(),
            frequency_khz: None,
            strategy: CorrelationStrategy::default(),
            window_seconds: DEFAULT_WINDOW_SECONDS,
            scoring: ScoringMode::default(),
            metric: Metric::default(),
            resample: Resample::default(),
            level_decoding: LevelDecoding::default(),
            markers: MarkerSet::default(),
            sources: Vec::new(),
        }
    }
}

impl AnalysisSettings {
    /// Get the config directory path for radiotrace
    pub fn get_config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::data_dir().map(|p| p.join("RadioTrace"))
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs::config_dir().map(|p| p.join("radiotrace"))
        }
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the config directory, falling back to defaults
    pub fn load() -> Self {
        let path = match Self::get_settings_path() {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings file: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Settings(format!("{}: {}", path.display(), e)))
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<()> {
        let path = Self::get_settings_path()
            .ok_or_else(|| Error::Settings("Could not determine config directory".to_string()))?;
        self.save_to(&path)
    }

    /// Save settings to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Settings(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::io(path, e))
    }

    /// Reject values no pass can run with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=MAX_WINDOW_SECONDS).contains(&self.window_seconds) {
            return Err(Error::Settings(format!(
                "window_seconds must be between 0 and {}, got {}",
                MAX_WINDOW_SECONDS, self.window_seconds
            )));
        }
        Ok(())
    }

    /// Parser configured with these markers and level decoding
    pub fn parser(&self) -> LogEntryParser {
        LogEntryParser::new(self.markers.clone(), self.level_decoding)
    }

    /// Field-by-field description for reports
    pub fn parameters(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("technology".to_string(), self.technology.to_string()),
            ("strategy".to_string(), self.strategy.to_string()),
            ("scoring".to_string(), self.scoring.to_string()),
            ("metric".to_string(), self.metric.to_string()),
            ("resample".to_string(), self.resample.to_string()),
        ];
        if self.strategy == CorrelationStrategy::Window {
            params.push(("window_seconds".to_string(), self.window_seconds.to_string()));
        }
        if let Some(freq) = self.frequency_khz {
            params.push(("frequency_khz".to_string(), freq.to_string()));
        }
        params
    }
}
