//! Error handling for delivery dashboard processing.
//!
//! Only structural failures surface here: unreadable files, missing
//! required columns, uploads of the wrong kind and invalid configuration.
//! Per-cell conversion failures are absorbed into missing values instead.

use crate::models::DataKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("CSV is missing required columns for {dataset}: {}", .columns.join(", "))]
    MissingColumns {
        dataset: String,
        columns: Vec<String>,
    },

    #[error(
        "The uploaded file appears to be {detected} data, expected {expected} data"
    )]
    DataKindMismatch {
        expected: DataKind,
        detected: DataKind,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unsupported export format for {path} (expected .csv or .parquet)")]
    UnsupportedExport { path: PathBuf },
}

impl DashboardError {
    /// Create a missing columns error for the named dataset
    pub fn missing_columns(dataset: impl Into<String>, columns: Vec<String>) -> Self {
        Self::MissingColumns {
            dataset: dataset.into(),
            columns,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
