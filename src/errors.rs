//! Error types for the dtstat pipeline.
//!
//! Errors are categorized so the top level can pick the right operator-facing
//! behavior: configuration and input problems get a short pause before exit,
//! while locked output files (the report or history open in another program)
//! get a longer one so the operator has time to read the message, close the
//! file, and re-run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DtsError {
    /// A required configuration or input file does not exist.
    #[error("required file not found: {path}")]
    MissingFile { path: PathBuf },

    /// A configuration file exists but could not be parsed or failed validation.
    #[error("invalid configuration {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    /// The ticket export could not be read as a table.
    #[error("failed to read ticket table {path}: {message}")]
    InputTable { path: PathBuf, message: String },

    /// The ticket export is missing one of the fixed required columns.
    #[error("ticket table {path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    /// An output file could not be written, most likely because it is open in
    /// another program. Not retried; the operator closes the file and re-runs.
    #[error("failed to write {path} (close it if it is open elsewhere): {message}")]
    OutputLocked { path: PathBuf, message: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DtsError {
    pub fn invalid_config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn input_table(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InputTable {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn output_locked(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::OutputLocked {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Seconds to pause before exiting when this error aborts a run.
    pub fn exit_delay_secs(&self) -> u64 {
        match self {
            Self::MissingFile { .. }
            | Self::InvalidConfig { .. }
            | Self::InputTable { .. }
            | Self::MissingColumn { .. } => 5,
            Self::OutputLocked { .. } | Self::Io { .. } => 20,
        }
    }
}
