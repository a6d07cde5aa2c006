//! Typed column access over polars frames.
//!
//! Uploaded tables have a loose schema: any column may be absent and any
//! cell may be unparsable. These helpers turn "does the column exist and
//! what does it hold" into explicit `Option`s so callers branch on presence
//! instead of probing.

use crate::error::Result;
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashSet;

/// Whether `df` has a column called `name`
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Names of all columns, in frame order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

/// Values of `name` rendered as text; empty or whitespace-only cells are `None`
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

/// Values of `name` as floats (non-numeric cells become `None`)
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let values = column
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect();
    Ok(values)
}

/// Values of `name` as integers
pub fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.as_materialized_series().i64()?.into_iter().collect())
}

/// Values of a millisecond datetime column as naive timestamps
pub fn datetime_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let column = df.column(name)?;
    let millis = match column.dtype() {
        DataType::Datetime(TimeUnit::Milliseconds, _) => column.cast(&DataType::Int64)?,
        _ => column
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?,
    };
    let values = millis
        .as_materialized_series()
        .i64()?
        .into_iter()
        .map(|value| value.and_then(|ms| DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())))
        .collect();
    Ok(values)
}

/// Optional variant of [`string_values`]: `None` when the column is absent
pub fn optional_strings(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<String>>>> {
    if has_column(df, name) {
        string_values(df, name).map(Some)
    } else {
        Ok(None)
    }
}

/// Optional variant of [`float_values`]: `None` when the column is absent
pub fn optional_floats(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    if has_column(df, name) {
        float_values(df, name).map(Some)
    } else {
        Ok(None)
    }
}

/// Distinct non-missing values in order of first appearance
pub fn unique_in_order<T>(values: &[Option<T>]) -> Vec<T>
where
    T: Clone + Eq + std::hash::Hash,
{
    let mut seen = HashSet::new();
    values
        .iter()
        .flatten()
        .filter(|value| seen.insert((*value).clone()))
        .cloned()
        .collect()
}

/// Number of distinct non-missing values
pub fn count_distinct(values: &[Option<String>]) -> usize {
    values.iter().flatten().collect::<HashSet<_>>().len()
}

/// Keep the rows whose entry in `keep` is true
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Replace (or append) a float column
pub fn set_float_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

/// Replace (or append) an integer column
pub fn set_int_column(df: &mut DataFrame, name: &str, values: Vec<Option<i64>>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

/// Replace (or append) a text column
pub fn set_string_column(
    df: &mut DataFrame,
    name: &str,
    values: Vec<Option<String>>,
) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

/// Replace (or append) a millisecond datetime column
pub fn set_datetime_column(
    df: &mut DataFrame,
    name: &str,
    values: &[Option<NaiveDateTime>],
) -> Result<()> {
    let millis = Int64Chunked::from_iter_options(
        name.into(),
        values
            .iter()
            .map(|value| value.map(|dt| dt.and_utc().timestamp_millis())),
    );
    let datetimes = millis.into_datetime(TimeUnit::Milliseconds, None);
    df.with_column(datetimes.into_series())?;
    Ok(())
}

/// Sum of the present values; `None` when every value is missing
pub fn sum_present(values: &[Option<f64>]) -> Option<f64> {
    let mut present = values.iter().flatten().peekable();
    present.peek()?;
    Some(present.sum::<f64>())
}

/// Mean of the present values; `None` when every value is missing
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}
