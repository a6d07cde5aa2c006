//! Data kind detection and required column validation.
//!
//! An uploaded table is classified as first or last mile purely from the
//! column names it carries. The label is never stored; callers recompute it
//! for every upload.

use crate::constants::{FIRST_MILE_INDICATORS, LAST_MILE_INDICATORS};
use crate::error::{DashboardError, Result};
use crate::models::DataKind;
use serde::Serialize;
use tracing::debug;

/// Number of indicator columns of each kind present in a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndicatorScores {
    pub first_mile: usize,
    pub last_mile: usize,
}

impl IndicatorScores {
    /// Winning kind; a tie (including 0-0) goes to last mile
    pub fn kind(&self) -> DataKind {
        if self.first_mile > self.last_mile {
            DataKind::FirstMile
        } else {
            DataKind::LastMile
        }
    }
}

/// Count the first and last mile indicator columns among `columns`
pub fn indicator_scores<I, S>(columns: I) -> IndicatorScores
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut scores = IndicatorScores {
        first_mile: 0,
        last_mile: 0,
    };
    let mut seen: Vec<String> = Vec::new();

    for column in columns {
        let name = column.as_ref();
        if seen.iter().any(|s| s == name) {
            continue;
        }
        seen.push(name.to_string());

        if FIRST_MILE_INDICATORS.contains(&name) {
            scores.first_mile += 1;
        } else if LAST_MILE_INDICATORS.contains(&name) {
            scores.last_mile += 1;
        }
    }

    scores
}

/// Decide whether a table holds first mile or last mile data
///
/// First mile wins only with a strictly higher indicator score.
pub fn detect_data_type<I, S>(columns: I) -> DataKind
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let scores = indicator_scores(columns);
    let kind = scores.kind();
    debug!(
        "Detected {} (first mile score {}, last mile score {})",
        kind, scores.first_mile, scores.last_mile
    );
    kind
}

/// Coordinate columns a table of the given kind cannot be normalized without
pub fn required_columns(kind: DataKind) -> [&'static str; 4] {
    kind.coordinate_columns()
}

/// Required columns of `kind` that are absent from `columns`, in canonical order
pub fn missing_required_columns<I, S>(columns: I, kind: DataKind) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let present: Vec<String> = columns.into_iter().map(|c| c.as_ref().to_string()).collect();
    required_columns(kind)
        .iter()
        .filter(|required| !present.iter().any(|p| p == *required))
        .map(|required| required.to_string())
        .collect()
}

/// Fail with [`DashboardError::MissingColumns`] when a required column is absent
pub fn validate_columns<I, S>(columns: I, kind: DataKind) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let missing = missing_required_columns(columns, kind);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::missing_columns(kind.as_str(), missing))
    }
}
