//! Normalization of uploaded delivery tables.
//!
//! [`preprocess`] turns a text-typed upload into the table every dashboard
//! consumes:
//! - the kind's timestamp column is parsed into a datetime column
//! - coordinates, distance, order counts and weight are coerced to numbers
//! - rows missing any of the four coordinates are dropped
//! - last mile postcodes are forced to text
//! - each row gets the color of its microwarehouse (first mile) or hub
//!   (last mile), neutral gray when the category is unknown
//!
//! The caller's table is never modified.

use crate::cleaning::{coerce_count, coerce_numeric, parse_timestamp};
use crate::constants::columns;
use crate::detection::validate_columns;
use crate::error::Result;
use crate::frame::{self, column_names, has_column};
use crate::models::{DataKind, PreprocessReport, Rgba};
use crate::palette::{ColorPalette, generate_palette};
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// A normalized table together with the palette used to color it
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub kind: DataKind,
    pub frame: DataFrame,
    pub palette: ColorPalette,
    pub report: PreprocessReport,
}

impl PreparedTable {
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Same table with `frame` (typically a filtered subset) in place of the rows
    ///
    /// The palette is kept, so colors stay stable while filters change.
    pub fn with_frame(&self, frame: DataFrame) -> PreparedTable {
        PreparedTable {
            kind: self.kind,
            frame,
            palette: self.palette.clone(),
            report: self.report.clone(),
        }
    }
}

/// Normalize `table` as data of the given kind
///
/// Fails only when one of the kind's coordinate columns is absent; the
/// returned error names every missing column. Cell-level problems become
/// nulls, and unparsable timestamps are additionally reported as warnings.
pub fn preprocess(table: &DataFrame, kind: DataKind) -> Result<PreparedTable> {
    validate_columns(column_names(table), kind)?;

    let mut frame = table.clone();
    let mut report = PreprocessReport {
        input_rows: table.height(),
        ..Default::default()
    };

    // Step 1: timestamps
    let timestamp_column = kind.timestamp_column();
    if has_column(&frame, timestamp_column) {
        let raw = frame::string_values(&frame, timestamp_column)?;
        let parsed: Vec<_> = raw
            .iter()
            .map(|value| value.as_deref().and_then(parse_timestamp))
            .collect();

        let unparsed = raw
            .iter()
            .zip(&parsed)
            .filter(|(raw, parsed)| raw.is_some() && parsed.is_none())
            .count();
        if unparsed > 0 {
            let message = format!(
                "{} values in '{}' could not be parsed as dates and were left empty",
                unparsed, timestamp_column
            );
            warn!("{}", message);
            report.unparsed_timestamps = unparsed;
            report.warnings.push(message);
        }

        frame::set_datetime_column(&mut frame, timestamp_column, &parsed)?;
    }

    // Step 2: numeric coercion
    let coordinate_columns = kind.coordinate_columns();
    for name in coordinate_columns
        .iter()
        .copied()
        .chain([columns::DISTANCE_KMS, columns::WEIGHT])
    {
        if has_column(&frame, name) {
            let values = coerce_column(&frame, name)?;
            frame::set_float_column(&mut frame, name, values)?;
        }
    }

    if has_column(&frame, columns::NUM_ORDERS) {
        let counts = frame::string_values(&frame, columns::NUM_ORDERS)?
            .iter()
            .map(|value| value.as_deref().and_then(coerce_count))
            .collect();
        frame::set_int_column(&mut frame, columns::NUM_ORDERS, counts)?;
    }

    // Step 3: drop rows without a complete pair of coordinates
    let coordinates = coordinate_columns
        .iter()
        .map(|name| frame::float_values(&frame, name))
        .collect::<Result<Vec<_>>>()?;
    let keep: Vec<bool> = (0..frame.height())
        .map(|row| coordinates.iter().all(|values| values[row].is_some()))
        .collect();
    report.dropped_rows = keep.iter().filter(|k| !**k).count();
    if report.dropped_rows > 0 {
        frame = frame::filter_rows(&frame, &keep)?;
        debug!(
            "Dropped {} rows with missing coordinates",
            report.dropped_rows
        );
    }

    // Step 4: postcodes stay text so leading zeros survive
    if kind == DataKind::LastMile && has_column(&frame, columns::POSTCODE) {
        let postcodes = frame::string_values(&frame, columns::POSTCODE)?;
        frame::set_string_column(&mut frame, columns::POSTCODE, postcodes)?;
    }

    // Step 5: category colors
    let category_column = kind.category_column();
    let palette = match frame::optional_strings(&frame, category_column)? {
        Some(categories) => {
            let palette = generate_palette(frame::unique_in_order(&categories));
            let colors: Vec<Rgba> = categories
                .iter()
                .map(|category| palette.color_for(category.as_deref()))
                .collect();
            attach_colors(&mut frame, &colors)?;
            palette
        }
        None => {
            let message = format!(
                "Column '{}' not found; every row uses the neutral color",
                category_column
            );
            warn!("{}", message);
            report.warnings.push(message);
            let colors = vec![Rgba::NEUTRAL; frame.height()];
            attach_colors(&mut frame, &colors)?;
            ColorPalette::default()
        }
    };

    info!(
        "Normalized {} table: kept {} of {} rows, {} categories",
        kind,
        frame.height(),
        report.input_rows,
        palette.len()
    );

    Ok(PreparedTable {
        kind,
        frame,
        palette,
        report,
    })
}

fn coerce_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(frame::string_values(frame, name)?
        .iter()
        .map(|value| value.as_deref().and_then(coerce_numeric))
        .collect())
}

fn attach_colors(frame: &mut DataFrame, colors: &[Rgba]) -> Result<()> {
    let channel = |pick: fn(&Rgba) -> u8| -> Vec<Option<i64>> {
        colors.iter().map(|c| Some(pick(c) as i64)).collect()
    };
    frame::set_int_column(frame, columns::COLOR_R, channel(|c| c.r))?;
    frame::set_int_column(frame, columns::COLOR_G, channel(|c| c.g))?;
    frame::set_int_column(frame, columns::COLOR_B, channel(|c| c.b))?;
    frame::set_int_column(frame, columns::COLOR_A, channel(|c| c.a))?;
    Ok(())
}

/// Read back the per-row colors attached by [`preprocess`]
pub fn row_colors(frame: &DataFrame) -> Result<Vec<Rgba>> {
    let channels = [
        columns::COLOR_R,
        columns::COLOR_G,
        columns::COLOR_B,
        columns::COLOR_A,
    ]
    .iter()
    .map(|name| frame::int_values(frame, name))
    .collect::<Result<Vec<_>>>()?;

    let to_u8 = |value: Option<i64>| value.map_or(0, |v| v.clamp(0, 255) as u8);
    Ok((0..frame.height())
        .map(|row| {
            Rgba::new(
                to_u8(channels[0][row]),
                to_u8(channels[1][row]),
                to_u8(channels[2][row]),
                to_u8(channels[3][row]),
            )
        })
        .collect())
}
