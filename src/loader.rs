//! CSV loading and table export.
//!
//! Uploads are read with schema inference disabled so that every column
//! arrives as text. Type coercion then happens in one place, under the
//! tolerant rules of [`crate::cleaning`], and identifiers such as postcodes
//! keep their leading zeros.

use crate::error::{DashboardError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

fn read_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true)
        .map_parse_options(|options| options.with_truncate_ragged_lines(true))
}

/// Load a CSV export from disk with every column typed as text
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(DashboardError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    info!(
        "Loaded {} rows and {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Load a CSV export already held in memory (e.g. an uploaded file)
pub fn load_csv_bytes(bytes: impl Into<Vec<u8>>) -> Result<DataFrame> {
    let df = read_options()
        .into_reader_with_file_handle(Cursor::new(bytes.into()))
        .finish()?;

    debug!("Loaded {} rows from in-memory CSV", df.height());
    Ok(df)
}

/// Write a table as CSV or Snappy-compressed Parquet, chosen by extension
pub fn export_table(df: &DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    let mut df = df.clone();
    match extension.as_deref() {
        Some("csv") => {
            let mut file = File::create(path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)?;
        }
        Some("parquet") => {
            let file = File::create(path)?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)?;
        }
        _ => {
            return Err(DashboardError::UnsupportedExport {
                path: path.to_path_buf(),
            });
        }
    }

    info!("Exported {} rows to {}", df.height(), path.display());
    Ok(())
}
