//! radiotrace - drive-test analysis of radio tuner and GNSS recorder logs
//!
//! This library extracts typed measurements from free-text diagnostic logs,
//! aligns several recorded drives on a shared timeline, correlates radio
//! quality with GNSS fixes and scores the result for rendering.
//!
//! ## Module Structure
//!
//! - [`parsers`] - Log entry classification and measurement extraction
//! - [`store`] - Time series storage keyed by source and measurement kind
//! - [`analysis`] - Trip segmentation, correlation, quality scoring and chart series
//! - [`loader`] - Raw log and typed record file I/O
//! - [`extract`] - Batch extraction with progress reporting
//! - [`settings`] - Analysis settings persistence
//! - [`error`] - Error types
//! - [`cli`] - Command-line interface

pub mod analysis;
pub mod cli;
pub mod error;
pub mod extract;
pub mod loader;
pub mod parsers;
pub mod settings;
pub mod store;

pub use error::{Error, Result};
