//! Command-line interface.
//!
//! `extract` turns a raw recorder log into typed records; `analyze` runs a
//! full pass over one or more record files and emits the report as JSON.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::analysis::correlate::CorrelationStrategy;
use crate::analysis::quality::ScoringMode;
use crate::analysis::series::Resample;
use crate::parsers::{LevelDecoding, MarkerSet, Metric, Technology};
use crate::settings::AnalysisSettings;
use crate::{analysis, extract, loader};

/// Radio drive-test log extraction and analysis
#[derive(Parser, Debug)]
#[command(name = "radiotrace", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract typed measurements from a raw diagnostic log
    Extract(ExtractArgs),
    /// Segment, correlate and score extracted record files
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Raw log (JSON array of timeStamp/msgData objects)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the typed records
    #[arg(short, long)]
    pub output: PathBuf,

    /// Settings file; defaults to the one in the config directory
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON file overriding the marker substrings
    #[arg(long)]
    pub markers_config: Option<PathBuf>,

    /// DAB level decoding (signed, trailing_magnitude)
    #[arg(long)]
    pub level_decoding: Option<LevelDecoding>,
}

impl ExtractArgs {
    /// Apply command-line overrides on top of loaded settings
    pub fn apply(&self, settings: &mut AnalysisSettings) {
        if let Some(level_decoding) = self.level_decoding {
            settings.level_decoding = level_decoding;
        }
    }
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Typed record files, one per recorded drive
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Settings file; defaults to the one in the config directory
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Radio technology (dab, fm)
    #[arg(short, long)]
    pub technology: Option<Technology>,

    /// Carrier frequency in kHz
    #[arg(short, long)]
    pub frequency: Option<u32>,

    /// Correlation strategy (bucket, window)
    #[arg(long)]
    pub strategy: Option<CorrelationStrategy>,

    /// Half-width of the correlation window in seconds
    #[arg(long)]
    pub window: Option<f64>,

    /// Scoring mode (single, combined)
    #[arg(long)]
    pub scoring: Option<ScoringMode>,

    /// Metric to score and plot (level, snr)
    #[arg(short, long)]
    pub metric: Option<Metric>,

    /// Series resampling (original, 1s, 5s, 10s)
    #[arg(long)]
    pub resample: Option<Resample>,

    /// Restrict the analysis to these sources (file names); repeatable
    #[arg(long = "source")]
    pub sources: Vec<String>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Apply command-line overrides on top of loaded settings
    pub fn apply(&self, settings: &mut AnalysisSettings) {
        if let Some(technology) = self.technology {
            settings.technology = technology;
        }
        if self.frequency.is_some() {
            settings.frequency_khz = self.frequency;
        }
        if let Some(strategy) = self.strategy {
            settings.strategy = strategy;
        }
        if let Some(window) = self.window {
            settings.window_seconds = window;
        }
        if let Some(scoring) = self.scoring {
            settings.scoring = scoring;
        }
        if let Some(metric) = self.metric {
            settings.metric = metric;
        }
        if let Some(resample) = self.resample {
            settings.resample = resample;
        }
        if !self.sources.is_empty() {
            settings.sources = self.sources.clone();
        }
    }
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the parsed command
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Analyze(args) => run_analyze(args),
    }
}

// ============================================================================
// Extract
// ============================================================================

fn load_settings(config: Option<&Path>) -> anyhow::Result<AnalysisSettings> {
    Ok(match config {
        Some(path) => AnalysisSettings::load_from(path)?,
        None => AnalysisSettings::load(),
    })
}

fn run_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);
    if let Some(path) = &args.markers_config {
        settings.markers = load_markers(path)?;
    }
    let parser = settings.parser();

    let count = extract::extract_file(&args.input, &args.output, &parser, |percent| {
        tracing::info!("Progress: {}%", percent);
    })
    .with_context(|| format!("Failed to extract {}", args.input.display()))?;

    tracing::info!("Wrote {} records to {}", count, args.output.display());
    Ok(())
}

fn load_markers(path: &Path) -> anyhow::Result<MarkerSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read marker config {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid marker config {}", path.display()))
}

// ============================================================================
// Analyze
// ============================================================================

fn run_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);

    let store = loader::load_record_files(&args.files)?;
    let report = analysis::run(&store, &settings).context("Analysis failed")?;

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
