//! Error types shared by every stage of an analysis pass.
//!
//! Only dataset-level failures are represented here. Per-entry extraction
//! failures and empty correlation buckets never become errors: the former are
//! dropped by the parser, the latter resolve to a missing aggregate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an extraction or analysis pass
#[derive(Debug, Error)]
pub enum Error {
    /// The input is not valid structured data (bad JSON, bad timestamp, wrong shape)
    #[error("Malformed input in {origin}: {reason}")]
    MalformedInput { origin: String, reason: String },

    /// A set the pass depends on is empty after filtering
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings file could not be parsed or written
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl Error {
    pub(crate) fn malformed(origin: impl Into<String>, reason: impl ToString) -> Self {
        Error::MalformedInput {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
