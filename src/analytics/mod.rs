//! Dashboard analytics over normalized tables.
//!
//! Each dashboard is a report assembled from the normalized table after the
//! session filters have been applied: metric cards, ranked breakdowns, the
//! map view and the date span shown in the header. Reports are plain
//! serializable structs so any front end can render them.
//!
//! Breakdowns on a column the table does not carry come back as `None`
//! rather than as errors, since uploads routinely omit optional columns.

use crate::aggregate::{Truncated, value_counts};
use crate::config::MapSettings;
use crate::constants::{CLUSTER_MAP_PITCH, MISSING_LABEL};
use crate::error::Result;
use crate::frame::{self, has_column, mean_present};
use crate::models::{DataKind, Rgba};
use crate::normalizer::PreparedTable;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use serde::Serialize;

pub mod first_mile;
pub mod last_mile;

#[cfg(test)]
mod tests;

pub use first_mile::{FirstMileReport, first_mile_report};
pub use last_mile::{LastMileReport, last_mile_report};

/// Rows of a category with the color it is drawn in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: i64,
    pub color: Rgba,
}

/// A ranked table possibly cut down to its top rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTable<T> {
    pub rows: Vec<T>,
    /// Rows before truncation
    pub total: usize,
}

impl<T> TopTable<T> {
    pub fn hidden(&self) -> usize {
        self.total.saturating_sub(self.rows.len())
    }

    pub(crate) fn from_truncated<F>(truncated: Truncated, to_rows: F) -> Result<Self>
    where
        F: FnOnce(&DataFrame) -> Result<Vec<T>>,
    {
        Ok(Self {
            rows: to_rows(&truncated.frame)?,
            total: truncated.total_rows,
        })
    }
}

/// Initial viewport and layer toggles of a dashboard map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub use_clusters: bool,
    pub show_flow_lines: bool,
    pub arc_height: f64,
    /// Rows plotted on the map
    pub points: usize,
}

/// Earliest and latest timestamp of a table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateSpan {
    /// Header label, e.g. `Jan 05, 2024 to Jan 09, 2024`
    pub fn label(&self) -> String {
        format_date_range(self.start.date(), self.end.date())
    }
}

/// One bar of the distance distribution; `upper` is exclusive except for the last bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} to {}", start.format("%b %d, %Y"), end.format("%b %d, %Y"))
}

/// Rows per category (microwarehouse or hub), most frequent first
pub fn category_counts(prepared: &PreparedTable) -> Result<Vec<CategoryCount>> {
    let column = prepared.kind.category_column();
    if !has_column(&prepared.frame, column) {
        return Ok(Vec::new());
    }

    let counts = value_counts(&prepared.frame, &[column], "count")?;
    let keys = frame::string_values(&counts, column)?;
    let totals = count_values(&counts, "count")?;

    Ok(keys
        .into_iter()
        .zip(totals)
        .map(|(key, count)| CategoryCount {
            color: prepared.palette.color_for(key.as_deref()),
            label: key.unwrap_or_else(|| MISSING_LABEL.to_string()),
            count,
        })
        .collect())
}

/// Map viewport centered on the mean customer (first mile) or delivery
/// (last mile) position; `None` when there is nothing to plot
pub fn map_view(prepared: &PreparedTable, settings: &MapSettings) -> Result<Option<MapView>> {
    let (lat_column, lon_column) = prepared.kind.map_center_columns();
    let (Some(lats), Some(lons)) = (
        frame::optional_floats(&prepared.frame, lat_column)?,
        frame::optional_floats(&prepared.frame, lon_column)?,
    ) else {
        return Ok(None);
    };

    let (Some(center_lat), Some(center_lon)) = (mean_present(&lats), mean_present(&lons)) else {
        return Ok(None);
    };

    Ok(Some(MapView {
        center_lat,
        center_lon,
        zoom: settings.zoom,
        pitch: if settings.use_clusters {
            CLUSTER_MAP_PITCH
        } else {
            0.0
        },
        use_clusters: settings.use_clusters,
        // Flow lines are a first mile layer
        show_flow_lines: settings.show_flow_lines && prepared.kind == DataKind::FirstMile,
        arc_height: settings.arc_height,
        points: prepared.height(),
    }))
}

/// Span of the kind's timestamp column, ignoring missing timestamps
pub fn date_span(prepared: &PreparedTable) -> Result<Option<DateSpan>> {
    let column = prepared.kind.timestamp_column();
    if !has_column(&prepared.frame, column) {
        return Ok(None);
    }
    let stamps = frame::datetime_values(&prepared.frame, column)?;
    let mut present = stamps.into_iter().flatten();
    let Some(first) = present.next() else {
        return Ok(None);
    };
    let (start, end) = present.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)));
    Ok(Some(DateSpan { start, end }))
}

/// Equal-width histogram of the `kms` column
pub fn distance_histogram(frame: &DataFrame, bins: usize) -> Result<Option<Vec<DistanceBin>>> {
    let Some(values) = frame::optional_floats(frame, crate::constants::columns::DISTANCE_KMS)?
    else {
        return Ok(None);
    };
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() || bins == 0 {
        return Ok(None);
    }

    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return Ok(Some(vec![DistanceBin {
            lower: min,
            upper: max,
            count: present.len(),
        }]));
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in &present {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    Ok(Some(
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| DistanceBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count,
            })
            .collect(),
    ))
}

/// Group key labels of an aggregated frame; the missing-key group is
/// labelled [`MISSING_LABEL`]
pub(crate) fn key_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    Ok(frame::string_values(df, column)?
        .into_iter()
        .map(|key| key.unwrap_or_else(|| MISSING_LABEL.to_string()))
        .collect())
}

pub(crate) fn count_values(df: &DataFrame, column: &str) -> Result<Vec<i64>> {
    Ok(frame::int_values(df, column)?
        .into_iter()
        .map(|count| count.unwrap_or(0))
        .collect())
}

/// Number of distinct non-missing values of `column`, if present
pub(crate) fn distinct(df: &DataFrame, column: &str) -> Result<Option<usize>> {
    Ok(frame::optional_strings(df, column)?.map(|values| frame::count_distinct(&values)))
}
